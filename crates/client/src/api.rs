//! Typed calls against the BookShare REST API.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::{multipart, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use bookshare_db::{Book, BookRequest, BookStatus};

use crate::error::{ClientResult, ErrorBody};
use crate::models::{
    AuthResponse, BookDetail, BookEnvelope, BookList, BookPage, DashboardResponse, MessageResponse,
    ProfileResponse, RequestDetail, RequestEnvelope, RequestList,
};

/// Filters and page cursor for the listing endpoints. Empty filters are
/// left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ListParams {
    pub title: String,
    pub city: String,
    pub genre: String,
    pub status: String,
    pub page: usize,
    pub limit: usize,
}

impl ListParams {
    pub fn page(&self, page: usize) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query: Vec<(&'static str, String)> = [
            ("title", &self.title),
            ("city", &self.city),
            ("genre", &self.genre),
            ("status", &self.status),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| (name, value.clone()))
        .collect();
        query.push(("page", self.page.to_string()));
        query.push(("limit", self.limit.to_string()));
        query
    }
}

/// An image attached to a listing.
#[derive(Debug, Clone)]
pub struct CoverFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Listing fields for create and update. Unset fields are not sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookStatus>,
    #[serde(skip)]
    pub cover: Option<CoverFile>,
}

impl BookForm {
    fn text_fields(&self) -> Vec<(&'static str, String)> {
        let status = self.status.map(|s| s.as_str().to_string());
        [
            ("title", self.title.clone()),
            ("author", self.author.clone()),
            ("genre", self.genre.clone()),
            ("city", self.city.clone()),
            ("contact", self.contact.clone()),
            ("description", self.description.clone()),
            ("status", status),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }

    fn into_multipart(self) -> ClientResult<Option<multipart::Form>> {
        let fields = self.text_fields();
        let Some(cover) = self.cover else {
            return Ok(None);
        };

        let mut form = multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name, value);
        }
        let part = multipart::Part::bytes(cover.bytes)
            .file_name(cover.file_name)
            .mime_str(&cover.content_type)?;
        Ok(Some(form.part("coverImage", part)))
    }
}

/// Cloneable handle to the API. Clones share the bearer credential.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credential: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential(&self) -> Option<String> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_credential(&self, credential: Option<String>) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = credential;
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.credential() {
            Some(credential) => builder.bearer_auth(credential),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, failure: &str) -> ClientResult<T> {
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            tracing::debug!(status = status.as_u16(), message = ?body.message, "api call failed");
            return Err(body.into_error(status.as_u16(), failure));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_book_form(
        &self,
        method: Method,
        path: &str,
        form: BookForm,
        failure: &str,
    ) -> ClientResult<BookEnvelope<Book>> {
        let json_body = serde_json::to_value(&form)?;
        let builder = match form.into_multipart()? {
            Some(multipart) => self.request(method, path).multipart(multipart),
            None => self.request(method, path).json(&json_body),
        };
        self.send(builder, failure).await
    }

    pub async fn register(&self, user: &serde_json::Value) -> ClientResult<AuthResponse> {
        self.send(
            self.request(Method::POST, "/auth/register").json(user),
            "Registration failed",
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        self.send(
            self.request(Method::POST, "/auth/login")
                .json(&json!({ "email": email, "password": password })),
            "Login failed",
        )
        .await
    }

    pub async fn verify_token(&self, credential: &str) -> ClientResult<AuthResponse> {
        self.send(
            self.request(Method::POST, &format!("/auth/verifyToken/{credential}")),
            "Verification failed",
        )
        .await
    }

    pub async fn profile(&self) -> ClientResult<ProfileResponse> {
        self.send(self.request(Method::GET, "/users/profile"), "Failed to fetch profile")
            .await
    }

    pub async fn update_profile(&self, name: Option<&str>, mobile: Option<&str>) -> ClientResult<ProfileResponse> {
        self.send(
            self.request(Method::PUT, "/users/profile")
                .json(&json!({ "name": name, "mobile": mobile })),
            "Failed to update profile",
        )
        .await
    }

    pub async fn dashboard(&self) -> ClientResult<DashboardResponse> {
        self.send(self.request(Method::GET, "/users/dashboard"), "Failed to fetch dashboard")
            .await
    }

    pub async fn books(&self, params: &ListParams) -> ClientResult<BookPage> {
        self.send(
            self.request(Method::GET, "/books").query(&params.query()),
            "Failed to fetch books",
        )
        .await
    }

    pub async fn my_books(&self, params: &ListParams) -> ClientResult<BookPage> {
        self.send(
            self.request(Method::GET, "/books/me").query(&params.query()),
            "Failed to fetch books",
        )
        .await
    }

    pub async fn recent_books(&self) -> ClientResult<BookList> {
        self.send(self.request(Method::GET, "/books/recent-books"), "Failed to fetch books")
            .await
    }

    pub async fn book(&self, id: u64) -> ClientResult<BookEnvelope<BookDetail>> {
        self.send(
            self.request(Method::GET, &format!("/books/{id}")),
            "Failed to fetch book details",
        )
        .await
    }

    pub async fn add_book(&self, form: BookForm) -> ClientResult<BookEnvelope<Book>> {
        self.send_book_form(Method::POST, "/books", form, "Failed to add book")
            .await
    }

    pub async fn update_book(&self, id: u64, form: BookForm) -> ClientResult<BookEnvelope<Book>> {
        self.send_book_form(Method::PUT, &format!("/books/{id}"), form, "Failed to update book")
            .await
    }

    pub async fn delete_book(&self, id: u64) -> ClientResult<MessageResponse> {
        self.send(
            self.request(Method::DELETE, &format!("/books/{id}")),
            "Failed to delete book",
        )
        .await
    }

    pub async fn toggle_book_status(&self, id: u64, status: BookStatus) -> ClientResult<BookEnvelope<Book>> {
        self.send(
            self.request(Method::PATCH, &format!("/books/{id}/status"))
                .json(&json!({ "status": status })),
            "Failed to update book status",
        )
        .await
    }

    /// Every request on the board (owners only).
    pub async fn all_requests(&self) -> ClientResult<RequestList> {
        self.send(
            self.request(Method::GET, "/users/requests/owner"),
            "Failed to fetch requests",
        )
        .await
    }

    /// Requests the calling owner has answered.
    pub async fn my_requests(&self) -> ClientResult<RequestList> {
        self.send(
            self.request(Method::GET, "/users/requests/owner/me"),
            "Failed to fetch requests",
        )
        .await
    }

    /// Requests filed by the caller.
    pub async fn user_requests(&self) -> ClientResult<RequestList> {
        self.send(self.request(Method::GET, "/users/requests"), "Failed to fetch requests")
            .await
    }

    pub async fn request_by_id(&self, id: u64) -> ClientResult<RequestEnvelope<RequestDetail>> {
        self.send(
            self.request(Method::GET, &format!("/users/requests/{id}")),
            "Failed to fetch request",
        )
        .await
    }

    pub async fn add_request(&self, title: &str, description: &str) -> ClientResult<RequestEnvelope<BookRequest>> {
        self.send(
            self.request(Method::POST, "/users/requests")
                .json(&json!({ "title": title, "description": description })),
            "Failed to add request",
        )
        .await
    }

    pub async fn respond_to_request(&self, id: u64, response: &str) -> ClientResult<RequestEnvelope<BookRequest>> {
        self.send(
            self.request(Method::PUT, &format!("/users/requests/owner/{id}"))
                .json(&json!({ "response": response })),
            "Failed to update request",
        )
        .await
    }

    pub async fn delete_request(&self, id: u64) -> ClientResult<MessageResponse> {
        self.send(
            self.request(Method::DELETE, &format!("/users/requests/{id}")),
            "Failed to delete request",
        )
        .await
    }
}
