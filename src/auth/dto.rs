use serde::{Deserialize, Serialize};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Response returned after registration.
#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    pub message: &'static str,
    pub username: String,
}

/// The caller's identity.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: String,
}
