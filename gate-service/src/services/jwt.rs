use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::config::JwtConfig;
use crate::services::ServiceError;

/// Verifies bearer tokens issued by the shared identity provider.
///
/// Signature, expiry, and audience checks are delegated to `jsonwebtoken`;
/// issuer trust is decided separately by the gate.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    audience: String,
}

/// Claims carried by an access token. Per-request only, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer (identity-provider tenant boundary)
    pub iss: String,
    /// Subject (user or application identity)
    pub sub: String,
    /// Audience (this API)
    pub aud: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    pub jti: String,
    /// Granted scopes
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl TokenVerifier {
    /// Create a new verifier by loading the RSA public key from a file.
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        let public_key_pem = fs::read_to_string(&config.public_key_path).map_err(|e| {
            anyhow::anyhow!(
                "Failed to read public key from {}: {}",
                config.public_key_path,
                e
            )
        })?;

        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| anyhow::anyhow!("Failed to parse public key: {}", e))?;

        tracing::info!("Token verifier initialized with RS256 public key");

        Ok(Self {
            decoding_key,
            audience: config.audience.clone(),
        })
    }

    /// Verify a bearer token's signature, expiry, and audience, and decode
    /// its claims. The issuer claim is returned as-is for the gate to judge.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, ServiceError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.set_audience(&[&self.audience]);

        let token_data =
            decode::<AccessClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidToken
                    | ErrorKind::Base64(_)
                    | ErrorKind::Json(_)
                    | ErrorKind::Utf8(_) => ServiceError::MalformedToken(e.to_string()),
                    _ => ServiceError::InvalidToken(e),
                }
            })?;

        Ok(token_data.claims)
    }
}
