use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::extract::ApiJson;
use super::{ApiError, AppState, SignupRequest, TokenRequest};
use crate::domain::Caller;
use crate::services::{AuthError, SignupResult};

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Conflict(msg) => Self::Conflict(msg),
            AuthError::UserNotFound => Self::NotFound("User not found".to_string()),
            AuthError::InvalidCode => Self::validation("Invalid confirmation code"),
            AuthError::InvalidToken => Self::Unauthorized("Invalid or expired token".to_string()),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the `Authorization: Bearer <token>` header into a [`Caller`]
/// request extension. Requests without the header continue anonymously;
/// a header carrying a bad token is rejected outright.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = match extract_bearer(&headers) {
        Some(token) => {
            let principal = state.auth_service().authenticate(&token).await?;
            tracing::Span::current().record("user_id", principal.username.as_str());
            Caller::User(principal)
        }
        None => Caller::Anonymous,
    };

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/signup
/// Registers the pair and mails a confirmation code to the address.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<Json<SignupResult>, ApiError> {
    let result = state
        .auth_service()
        .signup(&payload.username, &payload.email)
        .await?;
    Ok(Json(result))
}

/// POST /auth/token
/// Exchanges a confirmation code for an access token, returned as a bare
/// JSON string.
pub async fn token(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<TokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state
        .auth_service()
        .issue_token(&payload.username, &payload.confirmation_code)
        .await?;
    Ok(Json(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer(&headers).as_deref(), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer(&headers), None);
    }
}
