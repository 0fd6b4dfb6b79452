//! Role-based page guard.
//!
//! Public pages are open to everyone. The login and register pages are for
//! anonymous visitors only. Everything else needs a credential that still
//! resolves, and the `/owner` and `/seeker` areas need the matching role.

use bookshare_db::{PublicUser, Role};

use crate::api::ApiClient;

pub const LOGIN_PATH: &str = "/auth/login";
pub const HOME_PATH: &str = "/";

const PUBLIC_PATHS: &[&str] = &["/books", "/", "/how-it-works"];
const AUTH_PATHS: &[&str] = &["/auth/login", "/auth/register"];
const OWNER_PREFIX: &str = "/owner";
const SEEKER_PREFIX: &str = "/seeker";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect {
        to: &'static str,
        /// The stored credential no longer resolves and should be dropped.
        clear_credential: bool,
    },
}

impl GuardDecision {
    fn redirect(to: &'static str) -> Self {
        GuardDecision::Redirect {
            to,
            clear_credential: false,
        }
    }

    fn to_login() -> Self {
        GuardDecision::Redirect {
            to: LOGIN_PATH,
            clear_credential: true,
        }
    }
}

fn dashboard_for(role: Role) -> &'static str {
    match role {
        Role::Owner => "/owner/dashboard",
        Role::Seeker => "/seeker/dashboard",
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn is_public(path: &str) -> bool {
        PUBLIC_PATHS
            .iter()
            .any(|p| path == *p || path.starts_with(&format!("{p}/")))
    }

    pub fn is_auth_page(path: &str) -> bool {
        AUTH_PATHS.contains(&path)
    }

    /// Decide for a visitor whose credential resolved to `user`, or who has
    /// none at all.
    pub fn decide(path: &str, user: Option<&PublicUser>) -> GuardDecision {
        if Self::is_public(path) {
            return GuardDecision::Allow;
        }

        let Some(user) = user else {
            return if Self::is_auth_page(path) {
                GuardDecision::Allow
            } else {
                GuardDecision::redirect(LOGIN_PATH)
            };
        };

        if path.starts_with(OWNER_PREFIX) && user.role != Role::Owner {
            return GuardDecision::redirect(HOME_PATH);
        }
        if path.starts_with(SEEKER_PREFIX) && user.role != Role::Seeker {
            return GuardDecision::redirect(HOME_PATH);
        }
        if Self::is_auth_page(path) {
            return GuardDecision::redirect(dashboard_for(user.role));
        }
        GuardDecision::Allow
    }

    /// Resolve `credential` against the API and decide. A credential the
    /// server rejects, or a failed lookup, sends the visitor to the login
    /// page with the credential cleared.
    pub async fn check(client: &ApiClient, path: &str, credential: Option<&str>) -> GuardDecision {
        if Self::is_public(path) {
            return GuardDecision::Allow;
        }
        let Some(credential) = credential else {
            return Self::decide(path, None);
        };

        match client.verify_token(credential).await {
            Ok(response) if response.success => Self::decide(path, Some(&response.user)),
            Ok(_) => GuardDecision::to_login(),
            Err(e) => {
                tracing::debug!(path, error = %e, "credential verification failed");
                GuardDecision::to_login()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> PublicUser {
        PublicUser {
            id: 1,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            mobile: "1234567890".into(),
            role,
        }
    }

    #[test]
    fn public_pages_are_open() {
        for path in ["/", "/books", "/books/3", "/how-it-works"] {
            assert_eq!(RouteGuard::decide(path, None), GuardDecision::Allow, "{path}");
        }
        assert!(!RouteGuard::is_public("/bookshelf"));
        assert!(!RouteGuard::is_public("/owner"));
    }

    #[test]
    fn anonymous_visitors_go_to_login() {
        assert_eq!(
            RouteGuard::decide("/owner/dashboard", None),
            GuardDecision::redirect(LOGIN_PATH)
        );
        assert_eq!(RouteGuard::decide("/auth/login", None), GuardDecision::Allow);
        assert_eq!(RouteGuard::decide("/auth/register", None), GuardDecision::Allow);
    }

    #[test]
    fn role_areas_require_the_role() {
        let owner = user(Role::Owner);
        let seeker = user(Role::Seeker);

        assert_eq!(RouteGuard::decide("/owner/books", Some(&owner)), GuardDecision::Allow);
        assert_eq!(
            RouteGuard::decide("/owner/books", Some(&seeker)),
            GuardDecision::redirect(HOME_PATH)
        );
        assert_eq!(
            RouteGuard::decide("/seeker/requests", Some(&owner)),
            GuardDecision::redirect(HOME_PATH)
        );
        assert_eq!(RouteGuard::decide("/seeker/requests", Some(&seeker)), GuardDecision::Allow);
        assert_eq!(RouteGuard::decide("/settings", Some(&seeker)), GuardDecision::Allow);
    }

    #[test]
    fn signed_in_visitors_skip_auth_pages() {
        assert_eq!(
            RouteGuard::decide("/auth/login", Some(&user(Role::Owner))),
            GuardDecision::redirect("/owner/dashboard")
        );
        assert_eq!(
            RouteGuard::decide("/auth/register", Some(&user(Role::Seeker))),
            GuardDecision::redirect("/seeker/dashboard")
        );
    }
}
