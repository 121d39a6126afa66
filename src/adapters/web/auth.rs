//! Bearer-token access gate.
//!
//! A single argon2 hash from `[auth] token_hash` decides who is a superuser.
//! There are no user accounts: a request either presents the token or it
//! does not.

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use rand::rngs::OsRng;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::warn;

use crate::domain::error::StockfolioError;
use crate::domain::service::Role;
use crate::ports::config_port::ConfigPort;

use super::AppState;

#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    token_hash: Option<String>,
}

impl AccessGate {
    pub fn new(token_hash: Option<String>) -> Self {
        Self { token_hash }
    }

    /// Reads `[auth] token_hash`. A hash that does not parse is a config error
    /// rather than a silently locked-down server.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockfolioError> {
        let token_hash = config.get_string("auth", "token_hash");
        if let Some(hash) = token_hash.as_deref() {
            PasswordHash::new(hash).map_err(|e| StockfolioError::ConfigInvalid {
                section: "auth".into(),
                key: "token_hash".into(),
                reason: e.to_string(),
            })?;
        } else {
            warn!("no [auth] token_hash configured; listing holdings is disabled");
        }
        Ok(Self { token_hash })
    }

    pub fn role_for(&self, headers: &HeaderMap) -> Role {
        match (self.token_hash.as_deref(), bearer_token(headers)) {
            (Some(hash), Some(token)) => verify_token(hash, token),
            _ => Role::Member,
        }
    }

    /// Same as [`role_for`](Self::role_for), with the argon2 check run on the
    /// blocking pool.
    pub async fn resolve_role(&self, headers: &HeaderMap) -> Role {
        let (Some(hash), Some(token)) = (self.token_hash.clone(), bearer_token(headers)) else {
            return Role::Member;
        };
        let token = token.to_string();
        match tokio::task::spawn_blocking(move || verify_token(&hash, &token)).await {
            Ok(role) => role,
            Err(e) => {
                warn!(error = %e, "token verification task failed");
                Role::Member
            }
        }
    }
}

fn verify_token(hash: &str, token: &str) -> Role {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return Role::Member;
    };
    if Argon2::default()
        .verify_password(token.as_bytes(), &parsed)
        .is_ok()
    {
        Role::Superuser
    } else {
        Role::Member
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Produce an argon2id PHC string for `[auth] token_hash`.
pub fn hash_token(token: &str) -> Result<String, StockfolioError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default());
    argon2
        .hash_password(token.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StockfolioError::invalid(format!("cannot hash token: {e}")))
}

/// The caller's role, resolved from the `Authorization` header.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Role);

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Caller(state.access.resolve_role(&parts.headers).await))
    }
}
