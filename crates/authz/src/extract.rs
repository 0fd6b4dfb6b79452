//! Request extractors for the authenticated user.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use bookshare_db::User;
use bookshare_http::AppError;

use crate::{Authenticator, AUTH_REQUIRED, OWNER_ONLY};

/// The user behind the request's bearer credential.
///
/// Rejects with 401 when the header is missing or the credential does not
/// resolve to a stored user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Like [`CurrentUser`], but additionally rejects non-owners with 403.
#[derive(Debug, Clone)]
pub struct OwnerUser(pub User);

/// Credential part of an `Authorization: Bearer <credential>` header.
pub fn bearer_credential(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, credential) = value.trim().split_once(' ')?;
    let credential = credential.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !credential.is_empty()).then_some(credential)
}

/// Check that `user` holds the owner role.
pub fn require_owner(user: &User) -> Result<(), AppError> {
    if user.is_owner() {
        Ok(())
    } else {
        Err(AppError::forbidden(OWNER_ONLY))
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    Authenticator: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let credential =
            bearer_credential(&parts.headers).ok_or_else(|| AppError::unauthorized(AUTH_REQUIRED))?;

        let authenticator = Authenticator::from_ref(state);
        let user = authenticator.resolve(credential).await?;
        tracing::debug!(user_id = user.id, role = %user.role, "request authenticated");
        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for OwnerUser
where
    Authenticator: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        require_owner(&user)?;
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use bookshare_db::{Role, Store};
    use bookshare_kernel::settings::{AuthSettings, TokenMode};
    use tower::ServiceExt;

    async fn app() -> Router {
        let store = Store::in_memory();
        store
            .write(|c| {
                for (email, role) in [("o@example.com", Role::Owner), ("s@example.com", Role::Seeker)] {
                    c.users.insert(User {
                        id: 0,
                        name: email.into(),
                        email: email.into(),
                        password: "secret1".into(),
                        mobile: "1234567890".into(),
                        role,
                    })?;
                }
                Ok::<_, bookshare_db::StoreError>(())
            })
            .await
            .unwrap();

        let settings = AuthSettings {
            token_mode: TokenMode::UserId,
            ..AuthSettings::default()
        };
        let auth = Authenticator::new(store, &settings);

        Router::new()
            .route("/me", get(|CurrentUser(user): CurrentUser| async move { user.email }))
            .route("/owner", get(|OwnerUser(user): OwnerUser| async move { user.email }))
            .with_state(auth)
    }

    async fn status(path: &str, authorization: Option<&str>) -> StatusCode {
        let mut request = Request::get(path);
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        app()
            .await
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "bearer 42".parse().unwrap());
        assert_eq!(bearer_credential(&headers), Some("42"));

        headers.insert(AUTHORIZATION, "Basic 42".parse().unwrap());
        assert_eq!(bearer_credential(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(bearer_credential(&headers), None);
    }

    #[tokio::test]
    async fn missing_or_unknown_credential_is_unauthorized() {
        assert_eq!(status("/me", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status("/me", Some("Bearer 77")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status("/me", Some("Bearer 2")).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn owner_guard_rejects_seekers() {
        assert_eq!(status("/owner", Some("Bearer 1")).await, StatusCode::OK);
        assert_eq!(status("/owner", Some("Bearer 2")).await, StatusCode::FORBIDDEN);
        assert_eq!(status("/owner", None).await, StatusCode::UNAUTHORIZED);
    }
}
