use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use bookshare_db::models::UserId;
use bookshare_db::{Store, User};
use bookshare_http::AppError;
use bookshare_kernel::settings::{AuthSettings, TokenMode};

use crate::INVALID_CREDENTIALS;

const MAX_TTL_HOURS: u64 = 24 * 365;

/// Signed token claims. `sub` is the decimal user id.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    iat: i64,
    exp: i64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues credentials at login and turns bearer credentials back into users.
#[derive(Clone)]
pub struct Authenticator {
    store: Store,
    mode: TokenMode,
    keys: Arc<Keys>,
    ttl: Duration,
}

impl Authenticator {
    pub fn new(store: Store, settings: &AuthSettings) -> Self {
        let secret = if settings.token_secret.is_empty() {
            if settings.token_mode == TokenMode::Signed {
                tracing::warn!("auth.token_secret is empty; using a per-process secret, tokens will not survive a restart");
            }
            format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
        } else {
            settings.token_secret.clone()
        };

        let ttl_hours = settings.token_ttl_hours.clamp(1, MAX_TTL_HOURS);

        Self {
            store,
            mode: settings.token_mode,
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            }),
            ttl: Duration::hours(ttl_hours as i64),
        }
    }

    pub fn mode(&self) -> TokenMode {
        self.mode
    }

    /// Credential handed back by register and login.
    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        match self.mode {
            TokenMode::UserId => Ok(user.id.to_string()),
            TokenMode::Signed => {
                let now = OffsetDateTime::now_utc();
                let claims = Claims {
                    sub: user.id.to_string(),
                    role: user.role.to_string(),
                    iat: now.unix_timestamp(),
                    exp: (now + self.ttl).unix_timestamp(),
                };
                let token = jsonwebtoken::encode(
                    &Header::new(Algorithm::HS256),
                    &claims,
                    &self.keys.encoding,
                )
                .context("failed to sign token")?;
                Ok(token)
            }
        }
    }

    /// User id named by `credential`, if it is well-formed (and, for signed
    /// tokens, carries a valid signature and has not expired).
    pub fn user_id_from(&self, credential: &str) -> Option<UserId> {
        let credential = credential.trim();
        match self.mode {
            TokenMode::UserId => credential.parse().ok(),
            TokenMode::Signed => {
                let validation = Validation::new(Algorithm::HS256);
                let data = jsonwebtoken::decode::<Claims>(credential, &self.keys.decoding, &validation)
                    .map_err(|e| tracing::debug!(error = %e, "token validation failed"))
                    .ok()?;
                data.claims.sub.parse().ok()
            }
        }
    }

    /// Resolve a bearer credential to the stored user.
    pub async fn resolve(&self, credential: &str) -> Result<User, AppError> {
        let id = self
            .user_id_from(credential)
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        self.store
            .read(|c| c.users.get(id).cloned())
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("mode", &self.mode)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
