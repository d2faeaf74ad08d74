//! Request extractors.
//!
//! Handlers that need a caller take [`AuthUser`]; public endpoints that only
//! personalize when a token happens to be present take [`MaybeAuthUser`].
//! Both read the `user::Model` the auth middleware stashed in request
//! extensions, so a rejection here means no valid bearer token was presented.

use axum::{extract::FromRequestParts, http::request::Parts};
use resolveit_common::AppError;
use resolveit_db::entities::user;

/// The authenticated caller. Rejects with 401 when the request carried no
/// valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticated_user(parts).map(Self).ok_or(AppError::Unauthorized)
    }
}

/// The caller when authenticated, `None` otherwise. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticated_user(parts)))
    }
}

fn authenticated_user(parts: &Parts) -> Option<user::Model> {
    parts.extensions.get::<user::Model>().cloned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;
    use resolveit_db::entities::user::Role;

    fn sample_user() -> user::Model {
        user::Model {
            id: "u1".to_string(),
            full_name: "Alice Example".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    fn parts_with_user(user: Option<user::Model>) -> Parts {
        let mut request = Request::builder().body(()).unwrap();
        if let Some(user) = user {
            request.extensions_mut().insert(user);
        }
        request.into_parts().0
    }

    #[tokio::test]
    async fn test_auth_user_requires_middleware_extension() {
        let mut parts = parts_with_user(None);
        let rejection = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(rejection, AppError::Unauthorized));

        let mut parts = parts_with_user(Some(sample_user()));
        let AuthUser(user) = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.id, "u1");
    }

    #[tokio::test]
    async fn test_maybe_auth_user_never_rejects() {
        let mut parts = parts_with_user(None);
        let MaybeAuthUser(user) = MaybeAuthUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(user.is_none());

        let mut parts = parts_with_user(Some(sample_user()));
        let MaybeAuthUser(user) = MaybeAuthUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user.unwrap().email, "alice@example.com");
    }
}
