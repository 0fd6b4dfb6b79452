use serde::{Deserialize, Serialize};

use bookshare_db::PublicUser;

/// Body of `POST /register`. Absent fields are reported by validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub mobile: Option<String>,
    pub role: Option<String>,
}

/// Body of `POST /login`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Answer to register, login and token verification.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: PublicUser,
    /// Signed credential for subsequent requests; absent in `user_id` mode,
    /// where the user id itself is the credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}
