//! Password hashing and secret comparison helpers.
//!
//! Passwords are stored as bcrypt hashes. Hashing is deliberately slow, so
//! async callers run these functions on the blocking pool.

use rand::distr::{Alphanumeric, SampleString};

pub use bcrypt::BcryptError;

/// Work factor for stored hashes.
pub const DEFAULT_HASH_COST: u32 = bcrypt::DEFAULT_COST;
/// Cheapest work factor bcrypt accepts.
pub const MIN_HASH_COST: u32 = 4; // bcrypt::MIN_COST is private

/// Random URL-safe token of `len` alphanumeric characters.
#[must_use]
pub fn random_token(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::rng(), len)
}

/// Hash `password` with a fresh salt.
///
/// # Errors
///
/// Returns `BcryptError` for a cost outside bcrypt's accepted range.
pub fn hash_password(password: &str, cost: u32) -> Result<String, BcryptError> {
    bcrypt::hash(password, cost)
}

/// Check `password` against a stored hash. Malformed hashes never match.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

/// Compare two secrets without stopping at the first differing byte.
#[must_use]
pub fn secrets_match(expected: &str, actual: &str) -> bool {
    expected.len() == actual.len()
        && expected
            .bytes()
            .zip(actual.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
