//! Email priority records — model, operations, tiers, and HTTP routes.

pub mod model;
pub mod routes;
pub mod service;
pub mod tier;

pub use model::{EmailPriority, IngestPayload, NewEmailPriority};
pub use routes::email_routes;
pub use service::EmailPriorityService;
pub use tier::{PriorityTier, TierCounts};
