//! Request interceptors guarding protected routes.
//!
//! The chain is always `require_token` then `require_permission`; use
//! [`protect`] rather than layering them by hand.

pub mod auth;
pub mod permission;

use axum::{middleware::from_fn_with_state, Router};

pub use auth::{AuthUser, CurrentUser, TOKEN_HEADER};
use permission::PermissionGate;

use crate::{auth::permissions::Permission, state::AppState};

/// Guards every route in `router`: authentication, then (if given) the
/// permission check. Only matched routes are guarded.
pub fn protect(
    router: Router<AppState>,
    state: &AppState,
    permission: Option<Permission>,
) -> Router<AppState> {
    let router = match permission {
        Some(permission) => router.route_layer(from_fn_with_state(
            PermissionGate {
                credentials: state.credentials.clone(),
                permission,
            },
            permission::require_permission,
        )),
        None => router,
    };
    // Added last so it runs first.
    router.route_layer(from_fn_with_state(state.clone(), auth::require_token))
}
