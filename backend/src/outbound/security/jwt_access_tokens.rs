//! HS256 JSON Web Token implementation of `AccessTokenService`.
//!
//! Tokens carry `{ "user_id": <i64>, "exp": <unix seconds> }` and are signed
//! with a shared secret. Validation allows no clock leeway.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{AccessTokenError, AccessTokenService};
use crate::domain::{AccessToken, UserId};

/// Token lifetime used when none is configured.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 72;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: i64,
    exp: i64,
}

/// Issues and verifies HS256 bearer tokens.
pub struct JwtAccessTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl JwtAccessTokens {
    /// Build a token service from a signing secret and token lifetime.
    ///
    /// A negative `ttl` issues already-expired tokens, which tests use.
    pub fn new(secret: &[u8], ttl: TimeDelta) -> Self {
        let secret = Zeroizing::new(secret.to_vec());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(&secret),
            decoding: DecodingKey::from_secret(&secret),
            validation,
            ttl,
        }
    }

    /// Configured token lifetime.
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }
}

impl AccessTokenService for JwtAccessTokens {
    fn issue(&self, user_id: UserId) -> Result<AccessToken, AccessTokenError> {
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AccessTokenError::issue("token expiry out of range"))?;
        let claims = Claims {
            user_id: user_id.get(),
            exp: expires_at.timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(AccessToken::new)
            .map_err(|err| AccessTokenError::issue(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, AccessTokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AccessTokenError::expired(),
                _ => AccessTokenError::invalid(err.to_string()),
            })?;
        UserId::new(data.claims.user_id).map_err(|err| AccessTokenError::invalid(err.to_string()))
    }
}
