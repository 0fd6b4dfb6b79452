use serde::{Deserialize, Serialize};

use bookshare_db::Book;

/// Query string of the listing endpoints. Everything arrives as text so a
/// malformed `page` or `limit` falls back to its default instead of failing.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct BookQuery {
    pub title: Option<String>,
    pub city: Option<String>,
    pub genre: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Listing fields as submitted on create or update.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct BookFields {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl BookFields {
    /// Set a field from a multipart text part. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "title" => &mut self.title,
            "author" => &mut self.author,
            "genre" => &mut self.genre,
            "city" => &mut self.city,
            "contact" => &mut self.contact,
            "description" => &mut self.description,
            "status" => &mut self.status,
            _ => return,
        };
        *slot = Some(value);
    }
}

/// Body of `PATCH /{id}/status`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusPayload {
    pub status: Option<String>,
}

/// One page of a filtered listing, plus facet values.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPage {
    pub success: bool,
    pub books: Vec<Book>,
    pub cities: Vec<String>,
    pub genres: Vec<String>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct BookList {
    pub success: bool,
    pub books: Vec<Book>,
}

/// Contact details of a listing's owner.
#[derive(Debug, Default, Serialize)]
pub struct OwnerContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A book with its owner's contact details nested under `user`.
#[derive(Debug, Serialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub user: OwnerContact,
}

#[derive(Debug, Serialize)]
pub struct BookEnvelope<T> {
    pub success: bool,
    pub book: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> BookEnvelope<T> {
    pub fn new(book: T) -> Self {
        Self {
            success: true,
            book,
            message: None,
        }
    }

    pub fn with_message(book: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            book,
            message: Some(message.into()),
        }
    }
}
