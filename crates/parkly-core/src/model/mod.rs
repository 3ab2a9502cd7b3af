// ── Domain model ──
//
// Canonical record and request types for the four managed collections.

mod entity_id;
mod lenient;
pub mod parking_spot;
pub mod payment;
pub mod reservation;
pub mod user;
mod validate;

pub use entity_id::EntityId;
pub use parking_spot::{
    AvailabilityUpdate, NearbyQuery, NearbySpot, ParkingSpot, ParkingSpotDetail,
    ParkingSpotDraft, ParkingType, SpotComment, SpotImage,
};
pub use payment::{Payment, PaymentDraft, PaymentMethod, PaymentStatus};
pub use reservation::{CarType, Reservation, ReservationDraft, ReservationStatus};
pub use user::{CreateUser, UpdateUser, User, UserRole};
