mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use yamdb::config::Config;
use yamdb::domain::Role;
use yamdb::services::TokenKeys;

#[tokio::test]
async fn test_signup_then_token_exchange() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post(
            "/api/v1/auth/signup",
            None,
            json!({ "username": "reader", "email": "reader@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "reader");
    assert_eq!(body["email"], "reader@example.com");
    assert!(body.get("confirmation_code").is_none());

    let mail = app.mailer.last_to("reader@example.com").unwrap();
    assert_eq!(mail.subject, "YaMDb registration");
    let code = app.code_sent_to("reader@example.com");

    let (status, token) = app
        .post(
            "/api/v1/auth/token",
            None,
            json!({ "username": "reader", "confirmation_code": code }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = token.as_str().unwrap().to_string();

    // The code stays valid after use.
    let (status, _) = app
        .post(
            "/api/v1/auth/token",
            None,
            json!({ "username": "reader", "confirmation_code": code }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, me) = app.get("/api/v1/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "reader");
    assert_eq!(me["role"], "user");
}

#[tokio::test]
async fn test_token_rejects_wrong_code_and_unknown_user() {
    let app = TestApp::spawn().await;
    app.post(
        "/api/v1/auth/signup",
        None,
        json!({ "username": "reader", "email": "reader@example.com" }),
    )
    .await;

    let (status, body) = app
        .post(
            "/api/v1/auth/token",
            None,
            json!({ "username": "reader", "confirmation_code": "nope" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("confirmation code"));

    let (status, _) = app
        .post(
            "/api/v1/auth/token",
            None,
            json!({ "username": "ghost", "confirmation_code": "whatever" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signup_rejects_reserved_username_in_any_case() {
    let app = TestApp::spawn().await;

    for username in ["me", "Me", "ME", "mE"] {
        let (status, body) = app
            .post(
                "/api/v1/auth/signup",
                None,
                json!({ "username": username, "email": "me@example.com" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "username {username}");
        assert!(body["error"].as_str().unwrap().contains("username"));
    }

    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_signup_collisions() {
    let app = TestApp::spawn().await;
    let signup = |username: &'static str, email: &'static str| {
        app.post(
            "/api/v1/auth/signup",
            None,
            json!({ "username": username, "email": email }),
        )
    };

    assert_eq!(signup("reader", "reader@example.com").await.0, StatusCode::OK);
    let first_code = app.code_sent_to("reader@example.com");

    // Same pair again: a fresh code for the same account.
    assert_eq!(signup("reader", "reader@example.com").await.0, StatusCode::OK);
    let second_code = app.code_sent_to("reader@example.com");
    assert_ne!(first_code, second_code);

    assert_eq!(
        signup("reader", "other@example.com").await.0,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        signup("someone", "reader@example.com").await.0,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        signup("reader", "not-an-email").await.0,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_bad_token_is_rejected() {
    let app = TestApp::spawn().await;

    let (status, _) = app.get("/api/v1/categories", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/v1/categories", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_signed_with_default_key_is_rejected() {
    let app = TestApp::spawn().await;
    app.token_for("admin", Role::Admin).await;
    let admin = app
        .state
        .store()
        .users()
        .get_by_username("admin")
        .await
        .unwrap()
        .unwrap();

    let forged = TokenKeys::new(&Config::default().auth)
        .issue(admin.id, "admin")
        .unwrap();
    assert_eq!(
        app.get("/api/v1/users", Some(&forged)).await.0,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_deleted_user_token_stops_working() {
    let app = TestApp::spawn().await;
    let admin = app.token_for("admin", Role::Admin).await;
    let reader = app.token_for("reader", Role::User).await;

    assert_eq!(
        app.get("/api/v1/users/me", Some(&reader)).await.0,
        StatusCode::OK
    );
    assert_eq!(
        app.delete("/api/v1/users/reader", Some(&admin)).await.0,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        app.get("/api/v1/users/me", Some(&reader)).await.0,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_user_management_is_admin_only() {
    let app = TestApp::spawn().await;
    let admin = app.token_for("admin", Role::Admin).await;
    let moderator = app.token_for("moderator", Role::Moderator).await;

    assert_eq!(app.get("/api/v1/users", None).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.get("/api/v1/users", Some(&moderator)).await.0,
        StatusCode::FORBIDDEN
    );

    let (status, page) = app.get("/api/v1/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 2);
    assert_eq!(page["results"][0]["username"], "admin");

    let (status, _) = app.get("/api/v1/users/admin", Some(&moderator)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_user_crud() {
    let app = TestApp::spawn().await;
    let admin = app.token_for("admin", Role::Admin).await;

    let (status, created) = app
        .post(
            "/api/v1/users",
            Some(&admin),
            json!({
                "username": "critic",
                "email": "critic@example.com",
                "first_name": "Ann",
                "bio": "Reads a lot",
                "role": "moderator"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "moderator");
    assert_eq!(created["first_name"], "Ann");

    let (status, _) = app
        .post(
            "/api/v1/users",
            Some(&admin),
            json!({ "username": "critic", "email": "another@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, patched) = app
        .patch(
            "/api/v1/users/critic",
            Some(&admin),
            json!({ "role": "admin", "last_name": "Smith" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["role"], "admin");
    assert_eq!(patched["last_name"], "Smith");
    assert_eq!(patched["first_name"], "Ann");

    let (status, found) = app.get("/api/v1/users?search=crit", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["count"], 1);

    assert_eq!(
        app.delete("/api/v1/users/critic", Some(&admin)).await.0,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        app.get("/api/v1/users/critic", Some(&admin)).await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_admin_created_user_can_sign_up_for_a_code() {
    let app = TestApp::spawn().await;
    let admin = app.token_for("admin", Role::Admin).await;

    app.post(
        "/api/v1/users",
        Some(&admin),
        json!({ "username": "critic", "email": "critic@example.com" }),
    )
    .await;

    let (status, _) = app
        .post(
            "/api/v1/auth/signup",
            None,
            json!({ "username": "critic", "email": "critic@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let code = app.code_sent_to("critic@example.com");
    let (status, _) = app
        .post(
            "/api/v1/auth/token",
            None,
            json!({ "username": "critic", "confirmation_code": code }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_self_update_keeps_role() {
    let app = TestApp::spawn().await;
    let reader = app.token_for("reader", Role::User).await;

    let (status, body) = app
        .patch(
            "/api/v1/users/me",
            Some(&reader),
            json!({ "role": "admin", "bio": "Sci-fi fan", "first_name": "Rita" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");
    assert_eq!(body["bio"], "Sci-fi fan");
    assert_eq!(body["first_name"], "Rita");

    let stored = app
        .state
        .store()
        .users()
        .get_by_username("reader")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.role, Role::User);

    // Still not an admin as far as the policy is concerned.
    assert_eq!(
        app.get("/api/v1/users", Some(&reader)).await.0,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_profile_fields_can_be_cleared() {
    let app = TestApp::spawn().await;
    let reader = app.token_for("reader", Role::User).await;

    app.patch(
        "/api/v1/users/me",
        Some(&reader),
        json!({ "bio": "Sci-fi fan", "first_name": "Rita", "last_name": "Hale" }),
    )
    .await;

    let (status, body) = app
        .patch(
            "/api/v1/users/me",
            Some(&reader),
            json!({ "bio": null, "first_name": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["bio"].is_null());
    assert!(body["first_name"].is_null());
    assert_eq!(body["last_name"], "Hale");
}

#[tokio::test]
async fn test_malformed_bodies_get_json_errors() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post("/api/v1/auth/signup", None, json!({ "username": "reader" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("email"));

    let (status, body) = app.get("/api/v1/titles/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = app.get("/api/v1/genres?page=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_me_requires_authentication() {
    let app = TestApp::spawn().await;

    assert_eq!(
        app.get("/api/v1/users/me", None).await.0,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.patch("/api/v1/users/me", None, json!({ "bio": "x" }))
            .await
            .0,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_error_body_shape() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/v1/titles/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}
