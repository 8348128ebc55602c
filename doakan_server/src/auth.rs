//! Access tokens.
//!
//! Tokens are HS256 JWTs carrying a single custom claim, the user id. [`TokenIssuer`] mints them and
//! [`TokenValidator`] checks them. Both are built from the same [`AuthConfig`] at startup.
//!
//! Expiry is checked against the `now` passed in by the caller rather than the system clock, so that the validator has
//! no hidden inputs.
use chrono::{DateTime, Duration, Utc};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
    UntrustedToken,
};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{config::AuthConfig, errors::AuthError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub user_id: i64,
}

pub struct TokenIssuer {
    key: Hs256Key,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let key = Hs256Key::new(config.jwt_secret.reveal().as_bytes());
        Self { key, lifetime: config.token_lifetime }
    }

    pub fn issue_token(&self, user_id: i64, now: DateTime<Utc>) -> Result<String, AuthError> {
        let header = Header::empty().with_token_type("JWT");
        let mut claims = Claims::new(JwtClaims { user_id });
        claims.issued_at = Some(now);
        claims.expiration = Some(now + self.lifetime);
        let token = Hs256.token(&header, &claims, &self.key).map_err(|e| AuthError::TokenCreation(e.to_string()))?;
        debug!("🔐️ Issued access token for user #{user_id}, valid until {}", now + self.lifetime);
        Ok(token)
    }
}

pub struct TokenValidator {
    key: Hs256Key,
}

impl TokenValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: Hs256Key::new(config.jwt_secret.reveal().as_bytes()) }
    }

    /// Checks the token's signature and expiry. Tokens without an expiry are treated as expired.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, AuthError> {
        let untrusted = UntrustedToken::new(token).map_err(|e| {
            trace!("🔐️ Could not parse access token. {e}");
            AuthError::InvalidToken
        })?;
        let (_, claims) = Hs256
            .validator::<JwtClaims>(&self.key)
            .validate(&untrusted)
            .map_err(|e| {
                trace!("🔐️ Access token failed validation. {e}");
                AuthError::InvalidToken
            })?
            .into_parts();
        match claims.expiration {
            Some(exp) if now <= exp => Ok(claims.custom),
            Some(exp) => {
                trace!("🔐️ Access token for user #{} expired at {exp}", claims.custom.user_id);
                Err(AuthError::ExpiredToken)
            },
            None => {
                trace!("🔐️ Access token for user #{} has no expiry", claims.custom.user_id);
                Err(AuthError::ExpiredToken)
            },
        }
    }
}
