//! Password hashing and bearer-token authentication.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use verbatim_core::defaults::ACCESS_TOKEN_PREFIX;
use verbatim_core::{Error, Result, User};

use crate::error::ApiError;
use crate::state::AppState;

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against its stored PHC hash.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

/// Extractor for endpoints that require a valid access token.
///
/// Usage:
/// ```ignore
/// async fn my_handler(user: CurrentUser) -> impl IntoResponse {
///     // user.0 is the authenticated account
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                header.trim_start_matches("Bearer ").trim()
            }
            _ => return Err(ApiError::Unauthorized("Missing bearer token".to_string())),
        };

        if !token.starts_with(ACCESS_TOKEN_PREFIX) {
            return Err(ApiError::Unauthorized("Invalid token".to_string()));
        }

        let user_id = state
            .db
            .tokens
            .validate_access(token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

        let user = state
            .db
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

        if !user.is_active {
            return Err(ApiError::Unauthorized("Inactive user".to_string()));
        }

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("s3cret-passphrase").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret-passphrase", &hash));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hash = hash_password("correct horse").unwrap();
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn test_unique_salts() {
        let h1 = hash_password("same").unwrap();
        let h2 = hash_password("same").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_malformed_hash_rejected() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
