//! Password hashing.
//!
//! Hashes are PBKDF2-HMAC-SHA256 with a random 16-byte salt, stored as
//! `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`. The iteration count
//! travels with the hash so it can be raised without invalidating old rows.

use pbkdf2::pbkdf2_hmac;
use rand::Rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;
pub const DEFAULT_ITERATIONS: u32 = 60_000;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password must not be empty")]
    Empty,

    #[error("Malformed password hash: {0}")]
    Malformed(String),
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with(password, DEFAULT_ITERATIONS)
}

pub fn hash_password_with(password: &str, iterations: u32) -> Result<String, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill(&mut salt[..]);

    let digest = derive(password.as_bytes(), &salt, iterations.max(1));
    Ok(format!(
        "{SCHEME}${}${}${}",
        iterations.max(1),
        hex::encode(salt),
        hex::encode(digest)
    ))
}

/// Check a password against a stored hash.
///
/// Returns `Ok(false)` on mismatch and `Err` only when the stored value
/// cannot be parsed.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(PasswordError::Malformed("expected four '$'-separated fields".into()));
    };

    if scheme != SCHEME {
        return Err(PasswordError::Malformed(format!("unknown scheme '{scheme}'")));
    }
    let iterations: u32 = iterations
        .parse()
        .map_err(|_| PasswordError::Malformed("iteration count".into()))?;
    let salt = hex::decode(salt).map_err(|e| PasswordError::Malformed(format!("salt: {e}")))?;
    let expected =
        hex::decode(expected).map_err(|e| PasswordError::Malformed(format!("digest: {e}")))?;

    let actual = derive(password.as_bytes(), &salt, iterations.max(1));
    Ok(actual.as_slice().ct_eq(&expected).into())
}

fn derive(password: &[u8], salt: &[u8], iterations: u32) -> [u8; DIGEST_LEN] {
    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut digest);
    digest
}
