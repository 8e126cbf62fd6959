//! Manager tokens: a verified manager password buys a short-lived HS256 token that
//! privileged routes require as `Authorization: Bearer <token>`.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::AppState;
use crate::error::{PosError, PosResult};

const ISSUER: &str = "pos-service";
const MANAGER_SUBJECT: &str = "manager";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerClaims {
    pub sub: String,
    pub jti: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct ManagerTokens {
    password: Option<String>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl ManagerTokens {
    pub fn new(password: Option<String>, secret: &str, ttl: Duration) -> Self {
        Self {
            password: password.filter(|p| !p.is_empty()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Never matches when no manager password is configured.
    pub fn verify_password(&self, candidate: &str) -> bool {
        match &self.password {
            Some(password) => password == candidate,
            None => false,
        }
    }

    /// Returns the token and its expiry as a unix timestamp.
    pub fn issue(&self) -> PosResult<(String, i64)> {
        let now = Utc::now();
        let claims = ManagerClaims {
            sub: MANAGER_SUBJECT.to_string(),
            jti: Uuid::new_v4().to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let token = self.sign(&claims)?;
        Ok((token, claims.exp))
    }

    fn sign(&self, claims: &ManagerClaims) -> PosResult<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?)
    }

    pub fn validate(&self, token: &str) -> PosResult<ManagerClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<ManagerClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected manager token");
                PosError::Unauthorized("Invalid or expired manager token".to_string())
            })?;

        if data.claims.sub != MANAGER_SUBJECT {
            return Err(PosError::Unauthorized("Token is not a manager token".to_string()));
        }
        Ok(data.claims)
    }
}

/// Extracted from the bearer token on privileged routes; rejects with 401.
#[derive(Debug, Clone)]
pub struct ManagerSession(pub ManagerClaims);

#[async_trait]
impl FromRequestParts<AppState> for ManagerSession {
    type Rejection = PosError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| PosError::Unauthorized("Manager authorization required".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| PosError::Unauthorized("Expected a bearer token".to_string()))?;

        let claims = state.tokens.validate(token)?;
        Ok(ManagerSession(claims))
    }
}
