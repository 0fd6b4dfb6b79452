//! Cached queries and cache-invalidating mutations over [`ApiClient`].

use std::sync::Arc;

use bookshare_db::{Book, BookRequest, BookStatus};

use crate::api::{ApiClient, BookForm, ListParams};
use crate::cache::{keys, QueryCache, QueryKey};
use crate::error::ClientResult;
use crate::infinite::InfiniteList;
use crate::models::{
    AuthResponse, BookDetail, BookEnvelope, BookList, DashboardResponse, MessageResponse,
    ProfileResponse, RequestDetail, RequestEnvelope, RequestList,
};

/// Which listing endpoint a [`BookCursor`] pages through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookScope {
    All,
    Mine,
}

impl BookScope {
    fn key(self) -> QueryKey {
        match self {
            BookScope::All => keys::infinite_books(),
            BookScope::Mine => keys::infinite_my_books(),
        }
    }
}

/// API client plus a shared response cache.
#[derive(Debug, Clone)]
pub struct BookShare {
    client: ApiClient,
    cache: Arc<QueryCache>,
}

impl BookShare {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            cache: Arc::new(QueryCache::new()),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn invalidate_all(&self, families: &[QueryKey]) {
        for family in families {
            self.cache.invalidate(family);
        }
    }

    fn invalidate_book_lists(&self) {
        self.invalidate_all(&[
            keys::infinite_books(),
            keys::infinite_my_books(),
            keys::user_dashboard(),
        ]);
    }

    fn invalidate_request_lists(&self) {
        self.invalidate_all(&[
            keys::all_requests(),
            keys::my_requests(),
            keys::user_requests(),
        ]);
    }

    fn sign_in(&self, response: &AuthResponse) {
        self.client.set_credential(Some(response.credential()));
        self.cache.invalidate(&keys::user_dashboard());
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        let response = self.client.login(email, password).await?;
        self.sign_in(&response);
        Ok(response)
    }

    pub async fn register(&self, user: &serde_json::Value) -> ClientResult<AuthResponse> {
        let response = self.client.register(user).await?;
        self.sign_in(&response);
        Ok(response)
    }

    /// Drop the credential and everything cached under it.
    pub fn logout(&self) {
        self.client.set_credential(None);
        self.cache.clear();
    }

    pub async fn profile(&self) -> ClientResult<ProfileResponse> {
        self.cache
            .fetch(keys::user_profile(), || self.client.profile())
            .await
    }

    pub async fn update_profile(&self, name: Option<&str>, mobile: Option<&str>) -> ClientResult<ProfileResponse> {
        let response = self.client.update_profile(name, mobile).await?;
        self.cache.invalidate(&keys::user_profile());
        Ok(response)
    }

    pub async fn dashboard(&self) -> ClientResult<DashboardResponse> {
        self.cache
            .fetch(keys::user_dashboard(), || self.client.dashboard())
            .await
    }

    pub async fn recent_books(&self) -> ClientResult<BookList> {
        self.cache
            .fetch(keys::recent_books(), || self.client.recent_books())
            .await
    }

    pub async fn book(&self, id: u64) -> ClientResult<BookEnvelope<BookDetail>> {
        self.cache.fetch(keys::book(id), || self.client.book(id)).await
    }

    pub async fn add_book(&self, form: BookForm) -> ClientResult<BookEnvelope<Book>> {
        let response = self.client.add_book(form).await?;
        self.invalidate_book_lists();
        Ok(response)
    }

    pub async fn update_book(&self, id: u64, form: BookForm) -> ClientResult<BookEnvelope<Book>> {
        let response = self.client.update_book(id, form).await?;
        self.invalidate_book_lists();
        self.cache.invalidate(&keys::book(id));
        Ok(response)
    }

    pub async fn delete_book(&self, id: u64) -> ClientResult<MessageResponse> {
        let response = self.client.delete_book(id).await?;
        self.invalidate_book_lists();
        Ok(response)
    }

    pub async fn toggle_book_status(&self, id: u64, status: BookStatus) -> ClientResult<BookEnvelope<Book>> {
        let response = self.client.toggle_book_status(id, status).await?;
        self.invalidate_book_lists();
        self.cache.invalidate(&keys::book(id));
        Ok(response)
    }

    pub async fn all_requests(&self) -> ClientResult<RequestList> {
        self.cache
            .fetch(keys::all_requests(), || self.client.all_requests())
            .await
    }

    pub async fn my_requests(&self) -> ClientResult<RequestList> {
        self.cache
            .fetch(keys::my_requests(), || self.client.my_requests())
            .await
    }

    pub async fn user_requests(&self) -> ClientResult<RequestList> {
        self.cache
            .fetch(keys::user_requests(), || self.client.user_requests())
            .await
    }

    pub async fn request(&self, id: u64) -> ClientResult<RequestEnvelope<RequestDetail>> {
        self.cache
            .fetch(keys::request(id), || self.client.request_by_id(id))
            .await
    }

    pub async fn add_request(&self, title: &str, description: &str) -> ClientResult<RequestEnvelope<BookRequest>> {
        let response = self.client.add_request(title, description).await?;
        self.invalidate_request_lists();
        Ok(response)
    }

    pub async fn respond_to_request(&self, id: u64, answer: &str) -> ClientResult<RequestEnvelope<BookRequest>> {
        let response = self.client.respond_to_request(id, answer).await?;
        self.invalidate_request_lists();
        self.cache.invalidate(&keys::request(id));
        Ok(response)
    }

    pub async fn delete_request(&self, id: u64) -> ClientResult<MessageResponse> {
        let response = self.client.delete_request(id).await?;
        self.invalidate_request_lists();
        Ok(response)
    }

    /// Cursor over a listing endpoint, `params.limit` books per page.
    pub fn books_cursor(&self, scope: BookScope, params: ListParams) -> BookCursor {
        BookCursor {
            share: self.clone(),
            scope,
            list: InfiniteList::new(params.limit),
            params,
        }
    }
}

/// "Load more" cursor over `/books` or `/books/me`.
///
/// The loaded pages live under the scope's cache family; when a mutation
/// invalidates that family the cursor starts over from page zero.
#[derive(Debug)]
pub struct BookCursor {
    share: BookShare,
    scope: BookScope,
    params: ListParams,
    list: InfiniteList<Book>,
}

impl BookCursor {
    fn key(&self) -> QueryKey {
        let p = &self.params;
        self.scope
            .key()
            .with(&p.title)
            .with(&p.city)
            .with(&p.genre)
            .with(&p.status)
            .with(p.limit)
    }

    pub fn list(&self) -> &InfiniteList<Book> {
        &self.list
    }

    pub fn books(&self) -> Vec<&Book> {
        self.list.items().collect()
    }

    pub fn has_next_page(&self) -> bool {
        !self.share.cache.is_fresh(&self.key()) || self.list.has_next_page()
    }

    /// Fetch the next page. Returns the number of books it held, or `None`
    /// when the list is exhausted.
    pub async fn fetch_next(&mut self) -> ClientResult<Option<usize>> {
        let key = self.key();
        if !self.share.cache.is_fresh(&key) {
            self.list.reset();
        }

        let Some(page) = self.list.next_page() else {
            return Ok(None);
        };

        let params = self.params.page(page);
        let response = match self.scope {
            BookScope::All => self.share.client.books(&params).await?,
            BookScope::Mine => self.share.client.my_books(&params).await?,
        };

        let fetched = response.books.len();
        self.list.push_page(response.books);
        self.share.cache.set(key, &self.list)?;
        Ok(Some(fetched))
    }

    /// Fetch pages until the list is exhausted.
    pub async fn fetch_all(&mut self) -> ClientResult<usize> {
        while self.fetch_next().await?.is_some() {}
        Ok(self.list.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_key_carries_filters() {
        let share = BookShare::new(ApiClient::new("http://localhost:5000/api"));
        let cursor = share.books_cursor(
            BookScope::Mine,
            ListParams {
                city: "Paris".into(),
                limit: 8,
                ..Default::default()
            },
        );
        assert!(cursor.key().starts_with(&keys::infinite_my_books()));
        assert_eq!(cursor.key().segments()[2], "Paris");
        assert!(cursor.has_next_page());
    }

    #[test]
    fn logout_clears_credential_and_cache() {
        let share = BookShare::new(ApiClient::new("http://localhost:5000/api"));
        share.client().set_credential(Some("1".into()));
        share.cache().set(keys::user_profile(), &"Ada").unwrap();

        share.logout();
        assert!(share.client().credential().is_none());
        assert!(!share.cache().is_fresh(&keys::user_profile()));
    }
}
