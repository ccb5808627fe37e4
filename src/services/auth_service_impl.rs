//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{NewUser, Store};
use crate::domain::{Principal, validate};
use crate::services::auth_service::{AuthError, AuthService, SIGNUP_SUBJECT, SignupResult};
use crate::services::mailer::Mailer;
use crate::services::token::TokenKeys;

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenKeys,
    mailer: Arc<dyn Mailer>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, tokens: TokenKeys, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            store,
            tokens,
            mailer,
        }
    }
}

fn signup_body(code: &str) -> String {
    format!("Your confirmation code: {code}")
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn signup(&self, username: &str, email: &str) -> Result<SignupResult, AuthError> {
        validate::validate_username(username)?;
        validate::validate_email(email)?;

        let existing = self
            .store
            .users()
            .find_by_username_or_email(username, email)
            .await?;

        let code = Uuid::new_v4().to_string();

        match existing.as_slice() {
            [] => {
                self.store
                    .users()
                    .create(NewUser {
                        username: username.to_string(),
                        email: email.to_string(),
                        confirmation_code: Some(code.clone()),
                        ..NewUser::default()
                    })
                    .await?;
                info!(username = %username, "New user registered");
            }
            [user] if user.username == username && user.email == email => {
                self.store
                    .users()
                    .set_confirmation_code(user.clone(), &code)
                    .await?;
                info!(username = %username, "Confirmation code re-issued");
            }
            users => {
                let message = if users.iter().any(|u| u.username == username) {
                    "A user with that username already exists"
                } else {
                    "A user with that email already exists"
                };
                return Err(AuthError::Conflict(message.to_string()));
            }
        }

        if let Err(e) = self
            .mailer
            .send(email, SIGNUP_SUBJECT, &signup_body(&code))
            .await
        {
            warn!(username = %username, error = %e, "Failed to send confirmation code");
        }

        Ok(SignupResult {
            username: username.to_string(),
            email: email.to_string(),
        })
    }

    async fn issue_token(
        &self,
        username: &str,
        confirmation_code: &str,
    ) -> Result<String, AuthError> {
        let user = self
            .store
            .users()
            .get_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let matches = user
            .confirmation_code
            .as_deref()
            .is_some_and(|stored| !stored.is_empty() && stored == confirmation_code);

        if !matches {
            return Err(AuthError::InvalidCode);
        }

        self.tokens
            .issue(user.id, &user.username)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|_| AuthError::InvalidToken)?;
        let user_id = claims.user_id().map_err(|_| AuthError::InvalidToken)?;

        let user = self
            .store
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok(Principal {
            id: user.id,
            username: user.username,
            role: user.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_body_contains_code() {
        let body = signup_body("abc-123");
        assert!(body.contains("abc-123"));
    }
}
