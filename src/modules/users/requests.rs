//! "Wanted" requests: filed by any user, answered by owners.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use time::OffsetDateTime;

use bookshare_authz::{CurrentUser, OwnerUser};
use bookshare_db::{BookRequest, PublicUser};
use bookshare_http::{ApiJson, AppError};

use super::models::{NewRequest, RequestAnswer, RequestDetail, RequestEnvelope, RequestList};
use crate::modules::{parse_id, MessageResponse};
use crate::state::AppState;
use crate::validators::validate_request;

const INVALID_ID: &str = "Invalid request ID";
const NOT_FOUND: &str = "Request not found";
const NOT_YOUR_REQUEST: &str = "You can only delete your own requests";
const ALREADY_ANSWERED: &str = "This request has already been answered by another owner";

fn list(requests: Vec<BookRequest>, message: Option<&str>) -> Json<RequestList> {
    Json(RequestList {
        success: true,
        requests,
        message: message.map(str::to_string),
    })
}

pub(super) async fn create_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(payload): ApiJson<NewRequest>,
) -> Result<(StatusCode, Json<RequestEnvelope<BookRequest>>), AppError> {
    let errors = validate_request(payload.title.as_deref());
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let request = BookRequest {
        id: 0,
        title: payload.title.unwrap_or_default(),
        description: payload.description.unwrap_or_default(),
        user_id: user.id,
        respond: false,
        response: String::new(),
        owner_id: None,
        created_at: OffsetDateTime::now_utc(),
    };

    let request = state
        .store()
        .write(|c| c.requests.insert(request))
        .await
        .map_err(AppError::from)?;

    tracing::info!(request_id = request.id, user_id = user.id, "request filed");
    Ok((StatusCode::CREATED, Json(RequestEnvelope::new(request))))
}

pub(super) async fn my_requests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<RequestList>, AppError> {
    let requests = state
        .store()
        .read(|c| c.requests.find(|r| r.user_id == user.id))
        .await?;
    Ok(list(requests, Some("Requests retrieved successfully")))
}

/// Requests the calling owner has answered.
pub(super) async fn answered_by_me(
    State(state): State<AppState>,
    OwnerUser(owner): OwnerUser,
) -> Result<Json<RequestList>, AppError> {
    let requests = state
        .store()
        .read(|c| c.requests.find(|r| r.owner_id == Some(owner.id)))
        .await?;
    Ok(list(requests, None))
}

pub(super) async fn all_requests(
    State(state): State<AppState>,
    OwnerUser(_owner): OwnerUser,
) -> Result<Json<RequestList>, AppError> {
    let requests = state.store().read(|c| c.requests.all().to_vec()).await?;
    Ok(list(requests, None))
}

pub(super) async fn get_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<RequestEnvelope<RequestDetail>>, AppError> {
    let id = parse_id(&id, INVALID_ID)?;

    let detail = state
        .store()
        .read(|c| {
            c.requests.get(id).map(|request| {
                let public = |uid| c.users.get(uid).map(PublicUser::from);
                RequestDetail {
                    can_respond: request.can_respond(user.id),
                    user: public(request.user_id),
                    owner: request.owner_id.and_then(public),
                    request: request.clone(),
                }
            })
        })
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    Ok(Json(RequestEnvelope::with_message(
        detail,
        "Request retrieved successfully",
    )))
}

pub(super) async fn respond_to_request(
    State(state): State<AppState>,
    OwnerUser(owner): OwnerUser,
    Path(id): Path<String>,
    ApiJson(answer): ApiJson<RequestAnswer>,
) -> Result<Json<RequestEnvelope<BookRequest>>, AppError> {
    let id = parse_id(&id, INVALID_ID)?;
    let strict = state.policy().strict_ownership;

    let request = state
        .store()
        .write(|c| {
            let mut request = c
                .requests
                .get(id)
                .cloned()
                .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
            if strict && !request.can_respond(owner.id) {
                return Err(AppError::forbidden(ALREADY_ANSWERED));
            }
            request.response = answer.response.unwrap_or_default();
            request.respond = true;
            request.owner_id = Some(owner.id);
            Ok(c.requests.update(request)?)
        })
        .await?;

    tracing::info!(request_id = request.id, owner_id = owner.id, "request answered");
    Ok(Json(RequestEnvelope::with_message(
        request,
        "Request updated successfully",
    )))
}

pub(super) async fn delete_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, INVALID_ID)?;

    state
        .store()
        .write(|c| {
            let request = c
                .requests
                .get(id)
                .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
            if request.user_id != user.id {
                return Err(AppError::forbidden(NOT_YOUR_REQUEST));
            }
            c.requests.remove(id)?;
            Ok(())
        })
        .await?;

    tracing::info!(request_id = id, "request deleted");
    Ok(Json(MessageResponse::ok("Request deleted successfully")))
}
