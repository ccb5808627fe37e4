//! Request extractors whose rejections render as [`ApiError`] JSON bodies
//! instead of axum's plain-text defaults.
//!
//! Write handlers take their body as `Result<ApiJson<T>, ApiError>` so the
//! caller is authorized before a malformed body is reported.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

use super::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, response::IntoResponse};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Scored {
        score: i32,
    }

    async fn extract_json(body: &'static str) -> Result<ApiJson<Scored>, ApiError> {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        ApiJson::<Scored>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn test_json_rejection_is_validation_error() {
        let ApiJson(scored) = extract_json(r#"{"score": 4}"#).await.unwrap();
        assert_eq!(scored.score, 4);

        let err = extract_json(r#"{"text": "no score"}"#).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(ref msg) if msg.contains("score")));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_rejection_is_validation_error() {
        #[derive(Debug, Deserialize)]
        struct Paged {
            #[allow(dead_code)]
            page: u64,
        }

        let request = Request::builder().uri("/?page=abc").body(()).unwrap();
        let (mut parts, ()) = request.into_parts();
        let err = ApiQuery::<Paged>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }
}
