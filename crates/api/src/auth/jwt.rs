//! JWT token generation and validation
//!
//! Tokens are stateless: validity depends only on the signature and the
//! embedded expiry. There is no revocation list; `jti` is carried so one can
//! be keyed on later.

use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// JWT claims structure for Toolgate session tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// JWT ID
    pub jti: String,
}

/// A freshly signed token together with its metadata
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: OffsetDateTime,
}

/// JWT manager for token operations
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_token_ttl: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, algorithm: Algorithm, access_token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            access_token_ttl,
        }
    }

    /// Default lifetime for tokens issued at login
    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Issue a token for `subject` that expires `ttl` from now
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, ttl, OffsetDateTime::now_utc())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: OffsetDateTime,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| TokenError::Encoding(format!("token lifetime {} out of range", ttl)))?;
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
            jti: jti.clone(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_at,
        })
    }

    /// Validate and decode a token
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Validate a token against the clock reading `now`.
    ///
    /// A token is accepted only when its signature verifies with the
    /// configured algorithm and its expiry is strictly after `now`.
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Claims, TokenError> {
        // Explicit algorithm prevents algorithm confusion attacks.
        // Expiry is checked below against the caller's clock, without leeway.
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::Invalid("bad signature".to_string()),
                ErrorKind::InvalidAlgorithm => TokenError::Invalid("algorithm mismatch".to_string()),
                ErrorKind::MissingRequiredClaim(claim) => {
                    TokenError::Invalid(format!("missing claim '{}'", claim))
                }
                _ => TokenError::Invalid(e.to_string()),
            })?;

        if claims.exp <= now.unix_timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}
