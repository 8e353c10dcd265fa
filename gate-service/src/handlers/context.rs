//! Auth context handlers.
//!
//! Read-only views of the authenticated-tenant context the middleware
//! chain produced for this request.

use axum::extract::{Json, Query};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::services::{PolicyService, TenantContext};

/// Auth context response.
#[derive(Debug, Serialize)]
pub struct AuthContextResponse {
    pub tenant_id: Uuid,
    pub issuer: String,
    pub subject: String,
    pub scopes: Vec<String>,
}

/// Get auth context for the current request.
///
/// GET /auth/context
pub async fn get_auth_context(
    tenant: TenantContext,
    AuthUser(claims): AuthUser,
) -> Json<AuthContextResponse> {
    Json(AuthContextResponse {
        tenant_id: tenant.tenant_id,
        issuer: tenant.issuer,
        subject: claims.sub,
        scopes: claims.scopes,
    })
}

/// Query params for a capability check.
#[derive(Debug, Deserialize)]
pub struct AuthCheckQuery {
    pub capability: String,
}

#[derive(Debug, Serialize)]
pub struct AuthCheckResponse {
    pub allowed: bool,
    pub capability: String,
}

/// Check whether the caller holds a capability, without failing the
/// request on deny.
///
/// GET /auth/check
pub async fn check_capability(
    AuthUser(claims): AuthUser,
    Query(query): Query<AuthCheckQuery>,
) -> Json<AuthCheckResponse> {
    let allowed = PolicyService::is_allowed(&claims.scopes, &query.capability);
    Json(AuthCheckResponse {
        allowed,
        capability: query.capability,
    })
}
