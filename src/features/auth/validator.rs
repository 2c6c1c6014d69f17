use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

/// Where token signing keys come from
pub enum KeySource {
    /// RS256 keys published at the issuer's JWKS endpoint
    Jwks(Arc<JwksClient>),
    /// HS256 shared secret
    Secret(DecodingKey),
}

impl KeySource {
    pub fn secret(secret: &str) -> Self {
        KeySource::Secret(DecodingKey::from_secret(secret.as_bytes()))
    }
}

pub struct JwtValidator {
    keys: KeySource,
    issuer: String,
    audience: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    // iss, aud, exp and nbf are checked by jsonwebtoken itself
    sub: String,
    #[serde(default)]
    is_staff: bool,
    #[serde(default)]
    roles: Vec<String>,
}

impl JwtValidator {
    pub fn new(keys: KeySource, issuer: String, audience: String, leeway: Duration) -> Self {
        Self {
            keys,
            issuer,
            audience,
            leeway: leeway.as_secs(),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        let (decoding_key, algorithm) = match &self.keys {
            KeySource::Jwks(jwks_client) => {
                let kid = header
                    .kid
                    .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;
                let key = jwks_client
                    .get_key(&kid)
                    .await
                    .map_err(|e| AppError::Auth(e.to_string()))?;
                (key, Algorithm::RS256)
            }
            KeySource::Secret(key) => (key.clone(), Algorithm::HS256),
        };

        if header.alg != algorithm {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only {:?} is allowed",
                header.alg, algorithm
            )));
        }

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?
            .claims;

        // Audit fields store integer user ids, so the subject must be one
        let user_id = claims
            .sub
            .parse::<i32>()
            .map_err(|_| AppError::Auth("Token subject is not a numeric user id".to_string()))?;

        Ok(AuthenticatedUser {
            user_id,
            sub: claims.sub,
            is_staff: claims.is_staff,
            roles: claims.roles,
        })
    }
}
