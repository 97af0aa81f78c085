//! Customer session tokens: HS256 JWT access/refresh pairs.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub token_type: TokenKind,
    /// Expiration (Unix timestamp seconds)
    pub exp: u64,
    /// Issued at (Unix timestamp seconds)
    pub iat: u64,
}

impl SessionClaims {
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

fn unix_secs(at: chrono::DateTime<Utc>) -> u64 {
    u64::try_from(at.timestamp()).unwrap_or(0)
}

impl SessionKeys {
    #[must_use]
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    #[must_use]
    pub fn from_app_config(config: &vitrine_core::AppConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            Duration::minutes(config.access_token_ttl_mins),
            Duration::minutes(config.refresh_token_ttl_mins),
        )
    }

    /// Signs one token of `kind` for the user.
    ///
    /// # Errors
    ///
    /// Returns the signing error from `jsonwebtoken`.
    pub fn issue(
        &self,
        kind: TokenKind,
        user_id: i64,
        email: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            token_type: kind,
            exp: unix_secs(now + ttl),
            iat: unix_secs(now),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// # Errors
    ///
    /// Returns the signing error from `jsonwebtoken`.
    pub fn issue_pair(
        &self,
        user_id: i64,
        email: &str,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        Ok(TokenPair {
            access: self.issue(TokenKind::Access, user_id, email)?,
            refresh: self.issue(TokenKind::Refresh, user_id, email)?,
        })
    }

    /// Validates signature, expiry and token kind. `None` for any failure.
    #[must_use]
    pub fn verify(&self, token: &str, expected: TokenKind) -> Option<SessionClaims> {
        let validation = Validation::new(Algorithm::HS256);
        match jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation) {
            Ok(data) if data.claims.token_type == expected => Some(data.claims),
            Ok(_) => {
                tracing::debug!(?expected, "session token of the wrong kind");
                None
            }
            Err(e) => {
                tracing::debug!("session token validation failed: {e}");
                None
            }
        }
    }
}
