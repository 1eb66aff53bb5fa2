//! Token authentication interceptor and the identity it resolves.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{auth::jwt::JwtKeys, error::AppError, state::AppState};

/// Header carrying the bearer token.
pub const TOKEN_HEADER: &str = "x-access-tokens";

/// Identity resolved from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

/// Rejects the request unless it carries a valid, unexpired token, then
/// records the identity for the layers and handler behind it.
pub async fn require_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(TOKEN_HEADER)
        .ok_or(AppError::MissingToken)?;
    // Present but unreadable is a bad token, not a missing one.
    let token = header
        .to_str()
        .map_err(|_| {
            warn!("rejected token: header is not visible ASCII");
            AppError::InvalidToken
        })?
        .trim();
    if token.is_empty() {
        return Err(AppError::MissingToken);
    }

    let keys = JwtKeys::from_ref(&state);
    let username = keys.verify(token).map_err(|reason| {
        warn!(%reason, "rejected token");
        AppError::from(reason)
    })?;

    request.extensions_mut().insert(CurrentUser(username));
    Ok(next.run(request).await)
}

/// Handler-side access to the authenticated identity.
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .map(|u| AuthUser(u.0.clone()))
            .ok_or(AppError::MissingToken)
    }
}
