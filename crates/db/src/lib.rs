//! Embedded document store for BookShare.
//!
//! Three collections (users, books, requests) live in memory behind a single
//! async lock and are persisted as one JSON snapshot file.

pub mod collection;
pub mod error;
pub mod models;
pub mod module;
pub mod seed;
pub mod store;

pub use collection::{Collection, Record};
pub use error::{StoreError, StoreResult};
pub use models::{Book, BookRequest, BookStatus, PublicUser, Role, User};
pub use module::DbModule;
pub use store::{Autosave, Collections, Store};
