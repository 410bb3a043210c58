//! Digest helpers for event password protection.
//!
//! Event passwords are stored as an unsalted SHA-256 hex digest of the
//! trimmed password text.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a lowercase hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Digest stored in `events.password_hash` for the given password text.
pub fn hash_event_password(password: &str) -> String {
    sha256_hex(password)
}

/// Checks a supplied password against a stored digest.
///
/// An empty password never matches, mirroring the verification endpoint
/// that refuses blank input before hashing.
pub fn verify_event_password(password: &str, stored_hash: &str) -> bool {
    if password.is_empty() {
        return false;
    }
    hash_event_password(password).eq_ignore_ascii_case(stored_hash)
}
