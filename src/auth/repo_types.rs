use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub username: String,         // unique identity
    pub password_hash: String,    // Argon2 hash
    pub permissions: Vec<String>, // capability tags
}
