use serde::{Deserialize, Serialize};

use bookshare_db::{Book, BookRequest, PublicUser};

/// Body of `PUT /profile`; empty values leave the field unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub mobile: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: PublicUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Owner-side summary of the caller's listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_books: usize,
    pub available_books: usize,
    /// Listings whose status is anything other than available.
    pub rented_books: usize,
    pub my_books: Vec<Book>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub success: bool,
    pub dashboard: Dashboard,
    pub message: String,
}

/// Body of `POST /requests`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Body of `PUT /requests/owner/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RequestAnswer {
    pub response: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RequestList {
    pub success: bool,
    pub requests: Vec<BookRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A request with its requester and answering owner resolved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: BookRequest,
    pub can_respond: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<PublicUser>,
}

#[derive(Debug, Serialize)]
pub struct RequestEnvelope<T> {
    pub success: bool,
    pub request: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> RequestEnvelope<T> {
    pub fn new(request: T) -> Self {
        Self {
            success: true,
            request,
            message: None,
        }
    }

    pub fn with_message(request: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            request,
            message: Some(message.into()),
        }
    }
}
