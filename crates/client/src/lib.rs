//! Client side of BookShare.
//!
//! [`ApiClient`] speaks the REST API, [`QueryCache`] holds responses keyed by
//! resource and parameters, [`BookShare`] ties the two together so every
//! mutation invalidates the key families it affects, and [`guard`] decides
//! which pages a session may visit.

pub mod api;
pub mod cache;
pub mod error;
pub mod guard;
pub mod hooks;
pub mod infinite;
pub mod models;

pub use api::{ApiClient, BookForm, CoverFile, ListParams};
pub use cache::{keys, QueryCache, QueryKey};
pub use error::{ClientError, ClientResult};
pub use guard::{GuardDecision, RouteGuard};
pub use hooks::{BookCursor, BookShare, BookScope};
pub use infinite::InfiniteList;
