//! Issuer trust middleware.
//!
//! Runs after authentication: reads the verified claims, asks the gate
//! whether the issuer belongs to a registered, active tenant, and stores
//! the resulting `TenantContext` for downstream handlers. An untrusted
//! issuer terminates the pipeline here with 401; no handler runs.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use gate_core::error::AppError;

use crate::{
    services::{AccessClaims, TenantContext},
    AppState,
};

pub async fn issuer_gate_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = req.extensions().get::<AccessClaims>().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!(
            "Auth claims missing from request extensions"
        ))
    })?;

    let context = state.gate.authorize_issuer(&claims.iss).await?;

    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

/// Extractor for TenantContext from request extensions.
#[axum::async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("Tenant context not found")))
    }
}
