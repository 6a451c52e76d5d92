//! Authentication service - passwords, login and sessions.
//!
//! # Storage
//!
//! - Passwords are Argon2 PHC strings in `users.password_hash`
//! - Session tokens are 32 random bytes, hex encoded, handed out once;
//!   only their SHA-256 hash is written to `sessions.token_hash`

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::user::{LoginResponse, User},
    services::{audit_service, user_service},
};

/// Hash a password into an Argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC string. Malformed hashes never verify.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// SHA-256 of a bearer token, hex encoded (64 characters).
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// 64 hex characters (32 random bytes).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Minimum password length accepted when creating users.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Authenticate by email and password and open a session.
///
/// # Process
///
/// 1. Look up the user by email (case-insensitive)
/// 2. Reject inactive users and users without a password
/// 3. Verify the Argon2 hash
/// 4. Store the SHA-256 of a fresh token with its expiry
/// 5. Return the plain token (only time it's shown)
///
/// # Errors
///
/// - `InvalidCredentials`: unknown email, wrong password, inactive user
/// - `Database`: Database error occurred
pub async fn login(
    pool: &DbPool,
    email: &str,
    password: &str,
    session_ttl_hours: i64,
) -> Result<LoginResponse, AppError> {
    let user: User = user_service::find_by_email(pool, email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !user.active {
        return Err(AppError::InvalidCredentials);
    }

    let stored_hash = user
        .password_hash
        .as_deref()
        .ok_or(AppError::InvalidCredentials)?;
    if !verify_password(password, stored_hash) {
        tracing::warn!("Failed login for user {}", user.id);
        return Err(AppError::InvalidCredentials);
    }

    let token = generate_token();
    let expires_at = Utc::now() + Duration::hours(session_ttl_hours);

    sqlx::query(
        r#"
        INSERT INTO sessions (id, user_id, token_hash, expires_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(hash_token(&token))
    .bind(expires_at)
    .execute(pool)
    .await?;

    audit_service::record(
        pool,
        Some(user.id),
        "login",
        "Auth",
        Some(user.id),
        serde_json::json!({ "email": user.email }),
    )
    .await;
    tracing::info!("User {} logged in", user.id);

    Ok(LoginResponse {
        token,
        expires_at,
        user: user.into(),
    })
}

/// Revoke a session. Revoking twice is harmless.
pub async fn logout(pool: &DbPool, session_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE sessions SET revoked = true WHERE id = $1")
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Revoke every session of a user, e.g. when the account is deactivated.
pub async fn revoke_user_sessions(pool: &DbPool, user_id: i64) -> Result<u64, AppError> {
    let result = sqlx::query("UPDATE sessions SET revoked = true WHERE user_id = $1 AND revoked = false")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("admin123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let first = hash_password("correct horse").unwrap();
        let second = hash_password("correct horse").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_token_hash_is_sha256_hex() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
