//! Route handlers

pub mod health;
pub mod task;
pub mod users;

use axum::{http::Uri, Router};

use crate::error::ApiError;
use crate::state::AppState;

/// All API routes, with the JSON 404 fallback
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(users::router())
        .merge(task::router())
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Not Found - {}", uri.path()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::state::AppState;

    pub fn app() -> Router {
        super::router().with_state(AppState::in_memory("test-secret"))
    }

    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, payload)
    }

    /// Register a user and log in, returning `(user id, token)`
    pub async fn sign_up(app: &Router, email: &str, role: &str) -> (String, String) {
        let (status, _) = send(
            app,
            "POST",
            "/api/users/register",
            None,
            Some(serde_json::json!({
                "name": "Test User",
                "email": email,
                "password": "secret1",
                "role": role
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, payload) = send(
            app,
            "POST",
            "/api/users/login",
            None,
            Some(serde_json::json!({ "email": email, "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        (
            payload["user"]["id"].as_str().unwrap().to_string(),
            payload["token"].as_str().unwrap().to_string(),
        )
    }
}
