// parkly-api: Authenticated HTTP gateway for the parking-management backend

pub mod auth;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod geocode;
pub mod interceptor;
pub mod navigation;
pub mod session;
pub mod transport;

pub use auth::Credentials;
pub use error::Error;
pub use gateway::{ApiRequest, Gateway};
pub use geocode::{Coordinates, GeocodingClient};
pub use interceptor::{AuthExpiryInterceptor, Interceptor};
pub use navigation::{Navigator, Route};
pub use session::{Identity, MemoryTokenStorage, Role, Session, SessionStore, TokenStorage, Tokens};
pub use transport::{TlsMode, TransportConfig};
