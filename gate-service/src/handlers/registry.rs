use axum::extract::{Json, State};
use serde::Serialize;

use crate::models::TenantResponse;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RegistryListResponse {
    pub version: u64,
    pub tenant_count: usize,
    pub tenants: Vec<TenantResponse>,
}

/// List the registered tenants from the current snapshot.
///
/// GET /registry/tenants (requires `registry:read`)
pub async fn list_tenants(State(state): State<AppState>) -> Json<RegistryListResponse> {
    let snapshot = state.registry.snapshot();

    let mut tenants: Vec<TenantResponse> = snapshot
        .tenants()
        .cloned()
        .map(TenantResponse::from)
        .collect();
    tenants.sort_by(|a, b| a.issuer_url.cmp(&b.issuer_url));

    Json(RegistryListResponse {
        version: snapshot.version,
        tenant_count: tenants.len(),
        tenants,
    })
}
