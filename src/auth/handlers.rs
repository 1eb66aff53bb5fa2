use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, RegisteredResponse, TokenResponse, UserResponse},
        jwt::JwtKeys,
    },
    error::{AppError, AppResult},
    middleware::AuthUser,
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{3,64}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/user", get(get_user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RegisteredResponse>)> {
    let Json(mut payload) = payload?;
    payload.username = payload.username.trim().to_string();

    if !is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err(AppError::Validation(
            "Username must be 3-64 characters of letters, digits, '.', '_' or '-'".into(),
        ));
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::Validation("Password too short".into()));
    }

    state
        .credentials
        .register(
            &payload.username,
            &payload.password,
            state.config.default_permissions.clone(),
        )
        .await
        .map_err(|e| {
            warn!(username = %payload.username, error = %e, "registration refused");
            AppError::from(e)
        })?;

    info!(username = %payload.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisteredResponse {
            message: "User registered",
            username: payload.username,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Json(payload) = payload?;
    let username = payload.username.trim();

    if username.is_empty() || payload.password.is_empty() {
        return Err(AppError::InvalidCredentials);
    }

    if !state.credentials.verify(username, &payload.password).await? {
        warn!(username = %username, "login rejected");
        return Err(AppError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(username)?;

    info!(username = %username, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[instrument]
pub async fn get_user(AuthUser(username): AuthUser) -> Json<UserResponse> {
    Json(UserResponse { user: username })
}
