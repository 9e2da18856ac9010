//! Authentication and authorization gates
//!
//! Both are axum extractors: a handler that takes [`AuthUser`] only runs for
//! a request carrying a valid bearer token for an existing user, and one that
//! takes [`AdminUser`] additionally requires the `admin` role.

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use uuid::Uuid;

use taskboard_core::user::{Role, UserProfile};

use super::TokenError;
use crate::error::ApiError;
use crate::state::AppState;

const NO_TOKEN: &str = "Authentication required. No token provided.";
const USER_NOT_FOUND: &str = "User not found";
const ADMIN_REQUIRED: &str = "Access denied. Admin role required.";

/// The authenticated user, loaded without the password hash
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserProfile);

/// An authenticated user holding the `admin` role
#[derive(Debug, Clone)]
pub struct AdminUser(pub UserProfile);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| ApiError::unauthorized(NO_TOKEN))?;
        let claims = state.tokens().verify(token)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            tracing::debug!(sub = %claims.sub, "Token subject is not a user id");
            ApiError::from(TokenError::InvalidToken)
        })?;

        let user = state
            .users()
            .profile(user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized(USER_NOT_FOUND))?;

        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if user.role != Role::Admin {
            tracing::debug!(
                user_id = %user.id,
                role = user.role.as_str(),
                "Admin access denied: missing admin role"
            );
            return Err(ApiError::forbidden(ADMIN_REQUIRED));
        }

        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Utc;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/tasks");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    async fn register(state: &AppState, email: &str, role: &str) -> UserProfile {
        let input = taskboard_core::user::RegisterInput {
            name: Some("Tester".to_string()),
            email: Some(email.to_string()),
            password: Some("secret1".to_string()),
            role: Some(role.to_string()),
        };
        state.users().register(&input).await.unwrap()
    }

    fn rejection_message(err: ApiError) -> String {
        match err {
            ApiError::Unauthenticated(message) | ApiError::Forbidden(message) => message,
            other => panic!("Unexpected rejection: {:?}", other),
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts_with(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }

    #[tokio::test]
    async fn test_missing_token() {
        let state = AppState::in_memory("secret");
        let mut parts = parts_with(None);

        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(rejection_message(err), NO_TOKEN);
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let state = AppState::in_memory("secret");
        let mut parts = parts_with(Some("Bearer garbage"));

        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(rejection_message(err), "Invalid token");
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let state = AppState::in_memory("secret");
        let ghost = UserProfile {
            id: Uuid::new_v4(),
            name: "Ghost".to_string(),
            email: "ghost@example.com".to_string(),
            role: Role::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let token = state.tokens().issue(&ghost).unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {}", token)));

        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(rejection_message(err), USER_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_signed_token_with_malformed_subject() {
        let state = AppState::in_memory("secret");
        let now = Utc::now().timestamp() as usize;
        let claims = serde_json::json!({
            "sub": "not-a-uuid",
            "email": "ghost@example.com",
            "role": "admin",
            "iat": now,
            "exp": now + 3600,
        });
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {}", token)));

        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(rejection_message(err), "Invalid token");
    }

    #[tokio::test]
    async fn test_admin_gate() {
        let state = AppState::in_memory("secret");
        let user = register(&state, "user@example.com", "user").await;
        let admin = register(&state, "admin@example.com", "admin").await;

        let user_token = state.tokens().issue(&user).unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {}", user_token)));
        let AuthUser(authed) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(authed.id, user.id);
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(rejection_message(err), ADMIN_REQUIRED);

        let admin_token = state.tokens().issue(&admin).unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {}", admin_token)));
        let AdminUser(authed) = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(authed.id, admin.id);
    }
}
