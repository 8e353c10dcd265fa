pub mod error;
pub mod gate;
pub mod jwt;
pub mod policy;
pub mod registry;
pub mod store;

pub use error::ServiceError;
pub use gate::{IssuerTrustGate, TenantContext};
pub use jwt::{AccessClaims, TokenVerifier};
pub use policy::PolicyService;
pub use registry::{spawn_refresh_task, TenantRegistry, TenantSnapshot};
pub use store::{FileTenantStore, TenantStore};
