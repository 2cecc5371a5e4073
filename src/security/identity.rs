//! Resolution of the user that owns a write.
//!
//! Handlers never decide ownership themselves. They ask the
//! [`IdentityResolver`] held in [`AppState`] through the [`CurrentUser`]
//! extractor, which sees whatever the auth middleware put in the request
//! extensions.

use crate::AppState;
use crate::api::error::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::fmt;
use uuid::Uuid;

use super::claims::UserContext;

pub trait IdentityResolver: Send + Sync + fmt::Debug {
    /// The calling user, or `None` when the request cannot be attributed to anyone.
    fn current_user(&self, context: Option<&UserContext>) -> Option<Uuid>;
}

/// Attributes every request to one user, ignoring tokens.
#[derive(Debug, Clone, Copy)]
pub struct FixedIdentity {
    user_id: Uuid,
}

impl FixedIdentity {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

impl IdentityResolver for FixedIdentity {
    fn current_user(&self, _context: Option<&UserContext>) -> Option<Uuid> {
        Some(self.user_id)
    }
}

/// Uses the JWT subject when present, otherwise an optional fallback user.
///
/// A token whose subject is not a UUID resolves to nobody rather than to the
/// fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimsIdentity {
    fallback: Option<Uuid>,
}

impl ClaimsIdentity {
    pub fn new(fallback: Option<Uuid>) -> Self {
        Self { fallback }
    }
}

impl IdentityResolver for ClaimsIdentity {
    fn current_user(&self, context: Option<&UserContext>) -> Option<Uuid> {
        match context {
            Some(ctx) => Uuid::parse_str(&ctx.user_id).ok(),
            None => self.fallback,
        }
    }
}

/// Extractor yielding the owning user id for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let context = parts.extensions.get::<UserContext>();
        state
            .identity
            .current_user(context)
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized)
    }
}
