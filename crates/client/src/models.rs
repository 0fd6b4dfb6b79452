//! Response bodies as seen by the client.

use serde::{Deserialize, Serialize};

use bookshare_db::{Book, BookRequest, PublicUser};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: PublicUser,
    #[serde(default)]
    pub token: Option<String>,
}

impl AuthResponse {
    /// Bearer value for later calls: the signed token, or the user id when
    /// the server hands out none.
    pub fn credential(&self) -> String {
        self.token
            .clone()
            .unwrap_or_else(|| self.user.id.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPage {
    pub success: bool,
    pub books: Vec<Book>,
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookList {
    pub success: bool,
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnerContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    #[serde(default)]
    pub user: OwnerContact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookEnvelope<T> {
    pub success: bool,
    pub book: T,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: PublicUser,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_books: usize,
    pub available_books: usize,
    pub rented_books: usize,
    pub my_books: Vec<Book>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub success: bool,
    pub dashboard: Dashboard,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestList {
    pub success: bool,
    pub requests: Vec<BookRequest>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: BookRequest,
    pub can_respond: bool,
    #[serde(default)]
    pub user: Option<PublicUser>,
    #[serde(default)]
    pub owner: Option<PublicUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope<T> {
    pub success: bool,
    pub request: T,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn credential_prefers_the_token() {
        let mut response: AuthResponse = serde_json::from_value(json!({
            "success": true,
            "user": { "id": 7, "name": "Ada", "email": "a@b.co", "mobile": "1234567890", "role": "owner" },
            "token": "signed"
        }))
        .unwrap();
        assert_eq!(response.credential(), "signed");

        response.token = None;
        assert_eq!(response.credential(), "7");
    }

    #[test]
    fn book_detail_reads_flattened_book() {
        let detail: BookDetail = serde_json::from_value(json!({
            "id": 3,
            "title": "Dune",
            "author": "Frank Herbert",
            "genre": "sci-fi",
            "city": "Paris",
            "contact": "x",
            "description": "",
            "ownerId": 1,
            "status": "rented",
            "createdAt": "2024-01-01T00:00:00Z",
            "user": { "name": "Ada" }
        }))
        .unwrap();
        assert_eq!(detail.book.id, 3);
        assert_eq!(detail.user.name.as_deref(), Some("Ada"));
        assert!(detail.user.email.is_none());
    }
}
