use axum::{extract::Request, middleware::Next, response::Response};
use gate_core::error::AppError;

use crate::services::{AccessClaims, PolicyService, ServiceError, TenantContext};

/// Middleware to require a specific capability on a route.
///
/// Applied after authentication and the issuer gate, so a deny here is a
/// permission failure (403), distinct from the trust failures (401) that
/// precede it.
///
/// ```ignore
/// .layer(from_fn(|req, next| require_capability(req, next, "registry:read")))
/// ```
pub async fn require_capability(
    req: Request,
    next: Next,
    required: &'static str,
) -> Result<Response, AppError> {
    let claims = req.extensions().get::<AccessClaims>().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!(
            "Auth claims missing from request extensions"
        ))
    })?;

    if !PolicyService::is_allowed(&claims.scopes, required) {
        let tenant_id = req
            .extensions()
            .get::<TenantContext>()
            .map(|ctx| ctx.tenant_id.to_string())
            .unwrap_or_else(|| "-".to_string());
        tracing::warn!(
            subject = %claims.sub,
            tenant_id = %tenant_id,
            required_capability = %required,
            granted_scopes = ?claims.scopes,
            "Insufficient capability"
        );
        return Err(ServiceError::InsufficientCapability {
            capability: required.to_string(),
        }
        .into());
    }

    Ok(next.run(req).await)
}
