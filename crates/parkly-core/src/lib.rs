//! Domain layer between `parkly-api` and the console front end.
//!
//! - **[`ResourceTable<R>`]**: One generic controller for every managed
//!   collection: load, search, paginate, and the create / update / delete
//!   flow with a full re-fetch after each successful write. Parking spots
//!   add detail, image, availability and nearby operations on top.
//!
//! - **[`Resource`]**: Per-kind declarations (endpoint, sort key,
//!   searchable fields, category field, columns) implemented by the model
//!   types in [`model`].
//!
//! - **Statistics** ([`stats`], [`dashboard`]): Pure reducers producing
//!   seeded category counts and sums, plus the concurrent dashboard fan-out.
//!
//! - **[`ColumnVisibility`]**: Per-table column selection state.

pub mod columns;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod notify;
pub mod resource;
mod spots;
pub mod stats;
pub mod table;

// ── Primary re-exports ──────────────────────────────────────────────
pub use columns::ColumnVisibility;
pub use dashboard::{DashboardSnapshot, fetch_snapshot};
pub use error::CoreError;
pub use notify::{Level, Notification};
pub use resource::{ACTIONS_COLUMN, ColumnDef, Draft, Resource, ResourceKind, format_number};
pub use stats::{CategoryCounts, CountPolicy, Summary};
pub use table::{Confirm, Outcome, ResourceTable, TableState};

pub use model::{
    AvailabilityUpdate, CarType, CreateUser, EntityId, NearbyQuery, NearbySpot, ParkingSpot,
    ParkingSpotDetail, ParkingSpotDraft, ParkingType, Payment, PaymentDraft, PaymentMethod,
    PaymentStatus, Reservation, ReservationDraft, ReservationStatus, SpotComment, SpotImage,
    UpdateUser, User, UserRole,
};
