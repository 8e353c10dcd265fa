pub mod auth;
pub mod capability;
pub mod tenant;

pub use auth::{auth_middleware, AuthUser};
pub use capability::require_capability;
pub use tenant::issuer_gate_middleware;
