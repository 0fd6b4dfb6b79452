//! Identity resolution and role guards for BookShare handlers.
//!
//! A bearer credential is either a signed token issued at login or, in
//! `user_id` mode, the raw numeric user id. Either way it resolves to the
//! stored [`User`](bookshare_db::User) through the [`Authenticator`].

mod extract;
mod token;

pub use extract::{bearer_credential, require_owner, CurrentUser, OwnerUser};
pub use token::Authenticator;

/// No bearer credential on a protected route.
pub const AUTH_REQUIRED: &str = "Authentication required";
/// Credential present but it does not name an existing user.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";
/// Authenticated user is not an owner.
pub const OWNER_ONLY: &str = "Access denied. Only book owners can perform this action.";
