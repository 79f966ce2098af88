// Service exports
pub mod db;
pub mod profiles;
pub mod relay;
pub mod reports;
pub mod store;

pub use db::connect;
pub use profiles::{ProfileError, ProfileFields, ProfileStore};
pub use relay::{RelayDispatcher, Transport, TransportError, WebhookTransport};
pub use reports::{ReportError, ReportStore};
pub use store::{SessionStore, StoreError};
