//! Shared harness for the HTTP integration tests.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use yamdb::api::AppState;
use yamdb::config::Config;
use yamdb::db::NewUser;
use yamdb::domain::Role;
use yamdb::services::{Mailer, RecordingMailer};

pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(customize: impl FnOnce(&mut Config)) -> Self {
        let db_path =
            std::env::temp_dir().join(format!("yamdb-test-{}.db", uuid::Uuid::new_v4()));

        let mut config = Config::default();
        config.general.database_path = format!("sqlite:{}", db_path.display());
        config.auth.jwt_secret = yamdb::config::generate_secret();
        customize(&mut config);

        let mailer = Arc::new(RecordingMailer::new());
        let state =
            yamdb::api::create_app_state_with_mailer(config, mailer.clone() as Arc<dyn Mailer>)
                .await
                .expect("failed to create app state");

        let router = yamdb::api::router(state.clone());
        Self {
            state,
            router,
            mailer,
        }
    }

    /// Sends a request and returns the status with the decoded JSON body
    /// (`Value::Null` for empty bodies).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("PATCH", uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("DELETE", uri, token, None).await
    }

    /// Seeds an account directly in the store and exchanges its code for a
    /// token through the API.
    pub async fn token_for(&self, username: &str, role: Role) -> String {
        let code = format!("code-{username}");
        self.state
            .store()
            .users()
            .create(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                role,
                confirmation_code: Some(code.clone()),
                ..NewUser::default()
            })
            .await
            .expect("failed to seed user");

        let (status, body) = self
            .post(
                "/api/v1/auth/token",
                None,
                serde_json::json!({ "username": username, "confirmation_code": code }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "token exchange failed: {body}");
        body.as_str().expect("token is a JSON string").to_string()
    }

    /// Confirmation code from the latest signup mail sent to `email`.
    pub fn code_sent_to(&self, email: &str) -> String {
        let mail = self.mailer.last_to(email).expect("no mail sent");
        mail.body
            .rsplit(' ')
            .next()
            .expect("empty mail body")
            .to_string()
    }
}
