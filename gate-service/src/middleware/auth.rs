use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use gate_core::error::AppError;

use crate::{services::AccessClaims, services::ServiceError, AppState};

/// Middleware to require a verified bearer token.
///
/// Extracts the token from the Authorization header, verifies signature,
/// expiry, and audience, and stores the claims in request extensions.
/// Issuer trust is decided by the gate middleware afterwards.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let token = match token {
        Some(token) => token,
        None => return Err(ServiceError::MissingCredentials.into()),
    };

    let claims = state.verifier.verify(token)?;

    // Store claims in request extensions so downstream middleware and
    // handlers can access them
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Extractor to easily get claims in handlers
pub struct AuthUser(pub AccessClaims);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<AccessClaims>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Auth claims missing from request extensions"
            ))
        })?;

        Ok(AuthUser(claims.clone()))
    }
}
