use axum::{extract::State, Json};

use bookshare_authz::CurrentUser;
use bookshare_db::{BookStatus, PublicUser, StoreError};
use bookshare_http::{ApiJson, AppError};

use super::models::{Dashboard, DashboardResponse, ProfileResponse, ProfileUpdate};
use crate::state::AppState;

const DASHBOARD_BOOKS: usize = 4;

pub(super) async fn get_profile(CurrentUser(user): CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        success: true,
        user: PublicUser::from(user),
        message: None,
    })
}

pub(super) async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<Json<ProfileResponse>, AppError> {
    let updated = state
        .store()
        .write(|c| {
            let mut record = c
                .users
                .get(user.id)
                .cloned()
                .ok_or(StoreError::not_found("users", user.id))?;
            if let Some(name) = update.name.filter(|n| !n.is_empty()) {
                record.name = name;
            }
            if let Some(mobile) = update.mobile.filter(|m| !m.is_empty()) {
                record.mobile = mobile;
            }
            c.users.update(record)
        })
        .await
        .map_err(AppError::from)?;

    tracing::info!(user_id = updated.id, "profile updated");
    Ok(Json(ProfileResponse {
        success: true,
        user: PublicUser::from(updated),
        message: Some("Profile updated successfully".to_string()),
    }))
}

pub(super) async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DashboardResponse>, AppError> {
    let dashboard = state
        .store()
        .read(|c| {
            let mine = c.books.find(|b| b.owner_id == user.id);
            let available = mine
                .iter()
                .filter(|b| b.status == BookStatus::Available)
                .count();
            Dashboard {
                total_books: mine.len(),
                available_books: available,
                rented_books: mine.len() - available,
                my_books: mine.into_iter().take(DASHBOARD_BOOKS).collect(),
            }
        })
        .await?;

    Ok(Json(DashboardResponse {
        success: true,
        dashboard,
        message: "Dashboard retrieved successfully".to_string(),
    }))
}
