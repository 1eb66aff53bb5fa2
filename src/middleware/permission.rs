//! Permission gate layered behind token authentication.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::auth::CurrentUser;
use crate::{
    auth::{credentials::CredentialStore, permissions::Permission},
    error::AppError,
};

#[derive(Clone)]
pub struct PermissionGate {
    pub credentials: Arc<dyn CredentialStore>,
    pub permission: Permission,
}

/// Lets the request through only if the authenticated identity holds the
/// gate's permission. Without an identity it fails closed.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let CurrentUser(username) = request
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or(AppError::MissingToken)?;

    let granted = gate.credentials.permissions_of(&username).await?;
    if !granted.contains(gate.permission) {
        warn!(user = %username, permission = %gate.permission, "permission denied");
        return Err(AppError::PermissionDenied);
    }

    debug!(user = %username, permission = %gate.permission, "permission granted");
    Ok(next.run(request).await)
}
