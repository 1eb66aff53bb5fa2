use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

lazy_static! {
    /// Verifier checked against when the username is unknown, so a miss
    /// costs the same as a wrong password.
    static ref DUMMY_HASH: String =
        hash_password("fittrack-dummy-password").unwrap_or_else(|e| {
            error!(error = %e, "dummy hash unavailable; unknown-user logins will skip argon2");
            String::new()
        });
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Checks `plain` against `hash`, or against the dummy verifier when there
/// is no stored hash. Always returns false in the latter case.
pub fn verify_or_burn(plain: &str, hash: Option<&str>) -> anyhow::Result<bool> {
    match hash {
        Some(hash) => verify_password(plain, hash),
        None => {
            if let Err(e) = verify_password(plain, &DUMMY_HASH) {
                error!(error = %e, "dummy verification failed; unknown-user timing is not equalised");
            }
            Ok(false)
        }
    }
}
