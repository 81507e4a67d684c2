//! Security primitives for iSenior.
//!
//! Provides:
//! - **Passwords**: salted, iterated HMAC-SHA256 hashes with constant-time verification
//! - **Sessions**: bearer tokens mapped to a username and role, with expiry

pub mod password;
pub mod session;

pub use password::{hash_password, verify_password, PasswordError};
pub use session::{Session, SessionStore};
