pub mod tenant;

pub use tenant::{Tenant, TenantResponse, TenantState};
