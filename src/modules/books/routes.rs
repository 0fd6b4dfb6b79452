use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use time::OffsetDateTime;

use bookshare_authz::{CurrentUser, OwnerUser};
use bookshare_db::{Book, BookStatus, StoreError};
use bookshare_http::{ApiJson, AppError};

use super::form::BookForm;
use super::listing::{most_recent, paginate, BookFilter, PageRequest, RECENT_LIMIT};
use super::models::{BookDetail, BookEnvelope, BookList, BookPage, BookQuery, OwnerContact, StatusPayload};
use crate::modules::{parse_id, MessageResponse};
use crate::state::AppState;
use crate::uploads::store_cover;
use crate::validators::{validate_book, BookFields as RequiredBookFields};

const INVALID_ID: &str = "Invalid book ID";
const NOT_FOUND: &str = "Book not found";
const NOT_YOUR_LISTING: &str = "You can only update your own book listings";
const NOT_YOUR_DELETE: &str = "You can only delete your own book listings";
const INVALID_STATUS: &str = "Invalid status. Must be one of: available, rented, exchanged";

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

async fn load_book(state: &AppState, id: u64) -> Result<Book, AppError> {
    state
        .store()
        .read(|c| c.books.get(id).cloned())
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))
}

/// Persist `book` by id, failing if it was removed in the meantime.
async fn save_book(state: &AppState, book: Book) -> Result<Book, AppError> {
    state
        .store()
        .write(|c| match c.books.update(book) {
            Err(StoreError::NotFound { .. }) => Err(AppError::not_found(NOT_FOUND)),
            other => Ok(other?),
        })
        .await
}

pub(super) async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> Result<Json<BookPage>, AppError> {
    let filter = BookFilter::from_query(&query);
    let page = PageRequest::from_query(&query);

    let result = state
        .store()
        .read(|c| paginate(c.books.all(), &filter, page))
        .await?;
    Ok(Json(result))
}

pub(super) async fn my_books(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<BookQuery>,
) -> Result<Json<BookPage>, AppError> {
    let filter = BookFilter::from_query(&query);
    let page = PageRequest::from_query(&query);

    let result = state
        .store()
        .read(|c| {
            let mine = c.books.find(|b| b.owner_id == user.id);
            paginate(&mine, &filter, page)
        })
        .await?;
    Ok(Json(result))
}

pub(super) async fn recent_books(State(state): State<AppState>) -> Result<Json<BookList>, AppError> {
    let books = state
        .store()
        .read(|c| most_recent(c.books.all(), RECENT_LIMIT))
        .await?;
    Ok(Json(BookList {
        success: true,
        books,
    }))
}

pub(super) async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookEnvelope<BookDetail>>, AppError> {
    let id = parse_id(&id, INVALID_ID)?;

    let detail = state
        .store()
        .read(|c| {
            c.books.get(id).map(|book| {
                let user = c
                    .users
                    .get(book.owner_id)
                    .map(|owner| OwnerContact {
                        name: Some(owner.name.clone()),
                        mobile: Some(owner.mobile.clone()),
                        email: Some(owner.email.clone()),
                    })
                    .unwrap_or_default();
                BookDetail {
                    book: book.clone(),
                    user,
                }
            })
        })
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    Ok(Json(BookEnvelope::new(detail)))
}

pub(super) async fn create_book(
    State(state): State<AppState>,
    OwnerUser(owner): OwnerUser,
    form: BookForm,
) -> Result<(StatusCode, Json<BookEnvelope<Book>>), AppError> {
    let fields = form.fields;
    let errors = validate_book(&RequiredBookFields {
        title: fields.title.as_deref(),
        author: fields.author.as_deref(),
        city: fields.city.as_deref(),
        contact: fields.contact.as_deref(),
    });
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let cover_image = match &form.cover {
        Some(upload) => store_cover(state.covers(), state.uploads().max_bytes, upload).await?,
        None => state.uploads().default_cover_url.clone(),
    };

    let book = Book {
        id: 0,
        title: fields.title.unwrap_or_default(),
        author: fields.author.unwrap_or_default(),
        genre: fields.genre.unwrap_or_default(),
        city: fields.city.unwrap_or_default(),
        contact: fields.contact.unwrap_or_default(),
        description: fields.description.unwrap_or_default(),
        owner_id: owner.id,
        status: BookStatus::Available,
        cover_image: Some(cover_image),
        created_at: OffsetDateTime::now_utc(),
    };

    let book = state
        .store()
        .write(|c| c.books.insert(book))
        .await
        .map_err(AppError::from)?;

    tracing::info!(book_id = book.id, owner_id = owner.id, "book listed");
    Ok((StatusCode::CREATED, Json(BookEnvelope::new(book))))
}

pub(super) async fn update_book(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    form: BookForm,
) -> Result<Json<BookEnvelope<Book>>, AppError> {
    let id = parse_id(&id, INVALID_ID)?;
    let mut book = load_book(&state, id).await?;
    if book.owner_id != user.id {
        return Err(AppError::forbidden(NOT_YOUR_LISTING));
    }

    let fields = form.fields;
    if let Some(title) = non_empty(fields.title) {
        book.title = title;
    }
    if let Some(author) = non_empty(fields.author) {
        book.author = author;
    }
    if let Some(genre) = non_empty(fields.genre) {
        book.genre = genre;
    }
    if let Some(city) = non_empty(fields.city) {
        book.city = city;
    }
    if let Some(contact) = non_empty(fields.contact) {
        book.contact = contact;
    }
    if let Some(description) = non_empty(fields.description) {
        book.description = description;
    }
    if let Some(status) = fields.status.and_then(|s| s.parse::<BookStatus>().ok()) {
        book.status = status;
    }

    if let Some(upload) = &form.cover {
        let url = store_cover(state.covers(), state.uploads().max_bytes, upload).await?;
        book.cover_image = Some(url);
    }

    let book = save_book(&state, book).await?;
    tracing::info!(book_id = book.id, "book updated");
    Ok(Json(BookEnvelope::with_message(book, "Book updated successfully")))
}

pub(super) async fn delete_book(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, INVALID_ID)?;

    state
        .store()
        .write(|c| {
            let book = c.books.get(id).ok_or_else(|| AppError::not_found(NOT_FOUND))?;
            if book.owner_id != user.id {
                return Err(AppError::forbidden(NOT_YOUR_DELETE));
            }
            c.books.remove(id)?;
            Ok(())
        })
        .await?;

    tracing::info!(book_id = id, "book deleted");
    Ok(Json(MessageResponse::ok("Book deleted successfully")))
}

pub(super) async fn toggle_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<StatusPayload>,
) -> Result<Json<BookEnvelope<Book>>, AppError> {
    let id = parse_id(&id, INVALID_ID)?;
    let status: BookStatus = payload
        .status
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AppError::bad_request(INVALID_STATUS))?;

    let strict = state.policy().strict_ownership;
    let book = state
        .store()
        .write(|c| {
            let mut book = c
                .books
                .get(id)
                .cloned()
                .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
            if strict && book.owner_id != user.id {
                return Err(AppError::forbidden(NOT_YOUR_LISTING));
            }
            book.status = status;
            Ok(c.books.update(book)?)
        })
        .await?;

    tracing::info!(book_id = book.id, status = %status, changed_by = user.id, "book status changed");
    Ok(Json(BookEnvelope::with_message(
        book,
        format!("Book status updated to {status}"),
    )))
}
