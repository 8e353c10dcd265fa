//! Tenant model - one registered customer organization per issuer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant state codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantState {
    Active,
    Inactive,
}

impl TenantState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantState::Active => "active",
            TenantState::Inactive => "inactive",
        }
    }
}

/// Tenant entity.
///
/// Created during tenant sign-up by an external process; the validation
/// path only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub tenant_id: Uuid,
    /// Issuer URL of the tenant's identity-provider instance. Unique
    /// across all tenants.
    pub issuer_url: String,
    pub display_name: String,
    pub state: TenantState,
    pub created_utc: DateTime<Utc>,
}

impl Tenant {
    /// Create a new active tenant.
    pub fn new(issuer_url: String, display_name: String) -> Self {
        Self {
            tenant_id: Uuid::new_v4(),
            issuer_url,
            display_name,
            state: TenantState::Active,
            created_utc: Utc::now(),
        }
    }

    /// Check if tenant is active.
    pub fn is_active(&self) -> bool {
        self.state == TenantState::Active
    }
}

/// Tenant response for API.
#[derive(Debug, Serialize)]
pub struct TenantResponse {
    pub tenant_id: Uuid,
    pub issuer_url: String,
    pub display_name: String,
    pub state: TenantState,
    pub created_utc: DateTime<Utc>,
}

impl From<Tenant> for TenantResponse {
    fn from(t: Tenant) -> Self {
        Self {
            tenant_id: t.tenant_id,
            issuer_url: t.issuer_url,
            display_name: t.display_name,
            state: t.state,
            created_utc: t.created_utc,
        }
    }
}
