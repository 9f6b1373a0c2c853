//! argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) that embed their own salt
//! and parameters, so verification needs nothing but the stored string.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use tracing::warn;

use crate::error::AuthError;

const SALT_LEN: usize = 16;

/// A well-formed hash of no real password, at the default cost parameters.
const DECOY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$QbVo1Aq3AGIa42jnF4OtJA$6JQBHx+aqlQ0LOLccwRtii4x14OlwcyG7aAnjGdKYbk";

/// Hash `password` with a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::Hashing` if the OS RNG fails or argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut bytes = [0_u8; SALT_LEN];
    getrandom::fill(&mut bytes).map_err(|e| AuthError::Hashing(e.to_string()))?;
    let salt = SaltString::encode_b64(&bytes).map_err(|e| AuthError::Hashing(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check `password` against a stored PHC hash.
///
/// A wrong password is `Ok(false)`; only a malformed hash is an error.
///
/// # Errors
///
/// Returns `AuthError::Hashing` if `hash` is not a valid PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Do the work of one [`verify_password`] call against a hash that matches
/// nothing, so a login for an unknown email costs as much as a wrong password.
pub fn verify_decoy(password: &str) {
    if let Err(e) = verify_password(password, DECOY_HASH) {
        warn!(error = %e, "decoy hash rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_error() {
        assert!(matches!(
            verify_password("x", "not-a-hash"),
            Err(AuthError::Hashing(_))
        ));
    }

    #[test]
    fn decoy_hash_is_well_formed_and_matches_nothing() {
        assert!(!verify_password("", DECOY_HASH).unwrap());
        assert!(!verify_password("correct horse", DECOY_HASH).unwrap());
        verify_decoy("anything");
    }
}
