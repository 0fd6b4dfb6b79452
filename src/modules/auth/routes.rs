use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use bookshare_db::{PublicUser, Role, User};
use bookshare_http::{ApiJson, AppError};
use bookshare_kernel::settings::TokenMode;

use super::models::{AuthResponse, LoginPayload, RegisterPayload};
use crate::state::AppState;
use crate::validators::{validate_user, UserFields};

const EMAIL_TAKEN: &str = "User with this email already exists";
const CREDENTIALS_REQUIRED: &str = "Email and password are required";
const INVALID_LOGIN: &str = "Invalid email or password";

fn respond(state: &AppState, user: &User) -> Result<AuthResponse, AppError> {
    let token = match state.auth().mode() {
        TokenMode::Signed => Some(state.auth().issue_token(user)?),
        TokenMode::UserId => None,
    };
    Ok(AuthResponse {
        success: true,
        user: PublicUser::from(user),
        token,
    })
}

pub(super) async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterPayload>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let role = payload.role.as_deref().map(str::to_lowercase);

    let errors = validate_user(&UserFields {
        name: payload.name.as_deref(),
        email: payload.email.as_deref(),
        password: payload.password.as_deref(),
        mobile: payload.mobile.as_deref(),
        role: role.as_deref(),
    });
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let role: Role = role
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(AppError::bad_request)?;

    let user = User {
        id: 0,
        name: payload.name.unwrap_or_default(),
        email: payload.email.unwrap_or_default(),
        password: payload.password.unwrap_or_default(),
        mobile: payload.mobile.unwrap_or_default(),
        role,
    };

    let user = state
        .store()
        .write(move |c| {
            if c.users.find_one(|u| u.email == user.email).is_some() {
                return Err(AppError::bad_request(EMAIL_TAKEN));
            }
            Ok(c.users.insert(user)?)
        })
        .await?;

    tracing::info!(user_id = user.id, role = %user.role, "user registered");
    Ok((StatusCode::CREATED, Json(respond(&state, &user)?)))
}

pub(super) async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    let (Some(email), Some(password)) = (
        payload.email.filter(|e| !e.is_empty()),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::bad_request(CREDENTIALS_REQUIRED));
    };

    let user = state
        .store()
        .read(|c| c.users.find_one(|u| u.email == email).cloned())
        .await?
        .filter(|u| u.password == password)
        .ok_or_else(|| {
            tracing::debug!("login rejected");
            AppError::unauthorized(INVALID_LOGIN)
        })?;

    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(respond(&state, &user)?))
}

/// Resolve a credential the client already holds back to its user.
pub(super) async fn verify_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = match state.auth().resolve(&token).await {
        Ok(user) => user,
        Err(AppError::Unauthorized { .. }) => return Err(AppError::unauthorized(INVALID_LOGIN)),
        Err(other) => return Err(other),
    };

    Ok(Json(AuthResponse {
        success: true,
        user: PublicUser::from(&user),
        token: None,
    }))
}
