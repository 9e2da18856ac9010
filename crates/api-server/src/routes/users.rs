//! User API endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use taskboard_core::user::{LoginInput, RegisterInput, UserProfile};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    user: UserProfile,
}

/// POST /api/users/register
async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let Json(input) = body?;
    let user = state.users().register(&input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/users/login
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginInput>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(input) = body?;
    let user = state.users().login(&input).await?;
    let token = state.tokens().issue(&user)?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(LoginResponse { token, user }))
}

/// GET /api/users/profile
async fn profile(AuthUser(user): AuthUser) -> Json<UserProfile> {
    Json(user)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route("/api/users/profile", get(profile))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{app, send, sign_up};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn register_returns_profile_without_password() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/users/register",
            None,
            Some(json!({
                "name": "Grace Hopper",
                "email": "Grace@Example.com",
                "password": "cobol59"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["email"], "grace@example.com");
        assert_eq!(body["role"], "user");
        assert!(body.get("password").is_none());
        assert!(body.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn register_reports_every_invalid_field() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/users/register",
            None,
            Some(json!({
                "name": "G",
                "email": "not-an-email",
                "password": "123",
                "role": "root"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["name", "email", "password", "role"]);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let app = app();
        sign_up(&app, "dup@example.com", "user").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/users/register",
            None,
            Some(json!({
                "name": "Someone Else",
                "email": "DUP@example.com",
                "password": "secret2"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "email");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = app();
        let response = tower::ServiceExt::oneshot(
            app,
            axum::http::Request::builder()
                .method("POST")
                .uri("/api/users/login")
                .header("Content-Type", "application/json")
                .body(axum::body::Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_and_profile() {
        let app = app();
        let (user_id, token) = sign_up(&app, "dev@example.com", "admin").await;

        let (status, body) = send(&app, "GET", "/api/users/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], user_id.as_str());
        assert_eq!(body["role"], "admin");
        assert!(body.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = app();
        sign_up(&app, "dev@example.com", "user").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/users/login",
            None,
            Some(json!({ "email": "dev@example.com", "password": "wrong-pass" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");
    }

    #[tokio::test]
    async fn profile_requires_token() {
        let app = app();
        let (status, body) = send(&app, "GET", "/api/users/profile", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authentication required. No token provided.");

        let (status, body) =
            send(&app, "GET", "/api/users/profile", Some("forged"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");
    }
}
