//! Access token minting and verification (HS256 JWT).

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("Token subject is not a user id")]
    Subject,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id as a decimal string.
    pub sub: String,
    pub username: String,
    pub iss: String,
    pub iat: u64,
    pub exp: u64,
}

impl Claims {
    pub fn user_id(&self) -> Result<i32, TokenError> {
        self.sub.parse().map_err(|_| TokenError::Subject)
    }
}

#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl_secs: u64,
}

impl TokenKeys {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();

        let mut validation = Validation::default();
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
            ttl_secs: config.token_ttl_minutes.saturating_mul(60),
        }
    }

    pub fn issue(&self, user_id: i32, username: &str) -> Result<String, TokenError> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_with(secret: &str, issuer: &str) -> TokenKeys {
        TokenKeys::new(&AuthConfig {
            jwt_secret: secret.to_string(),
            token_ttl_minutes: 5,
            issuer: issuer.to_string(),
        })
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = keys_with("a-test-secret-that-is-long-enough!!", "yamdb");
        let token = keys.issue(42, "reader").unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.username, "reader");
        assert_eq!(claims.iss, "yamdb");
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn test_rejects_foreign_secret() {
        let ours = keys_with("a-test-secret-that-is-long-enough!!", "yamdb");
        let theirs = keys_with("another-secret-that-is-long-enough!", "yamdb");

        let token = theirs.issue(1, "mallory").unwrap();
        assert!(ours.verify(&token).is_err());
    }

    #[test]
    fn test_rejects_foreign_issuer() {
        let ours = keys_with("a-test-secret-that-is-long-enough!!", "yamdb");
        let theirs = keys_with("a-test-secret-that-is-long-enough!!", "elsewhere");

        let token = theirs.issue(1, "reader").unwrap();
        assert!(ours.verify(&token).is_err());
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let keys = TokenKeys::new(&AuthConfig {
            jwt_secret: "a-test-secret-that-is-long-enough!!".to_string(),
            token_ttl_minutes: u64::MAX,
            issuer: "yamdb".to_string(),
        });

        let token = keys.issue(7, "reader").unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.exp, u64::MAX);
        assert_eq!(claims.user_id().unwrap(), 7);
    }

    #[test]
    fn test_rejects_garbage() {
        let keys = keys_with("a-test-secret-that-is-long-enough!!", "yamdb");
        assert!(keys.verify("not.a.token").is_err());
        assert!(keys.verify("").is_err());
    }
}
