//! One-time code generation and hashing.
//!
//! Codes are six decimal digits. Only the SHA-256 hex digest is persisted.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Generate a random six digit code in `100000..=999999`.
pub fn generate_code() -> String {
    rand::random_range(100_000u32..=999_999).to_string()
}

pub fn hash_code(code: &str) -> String {
    const_hex::encode(Sha256::digest(code.as_bytes()))
}

/// Compare a submitted code against a stored hash in constant time.
pub fn codes_match(code: &str, stored_hash: &str) -> bool {
    hash_code(code)
        .as_bytes()
        .ct_eq(stored_hash.as_bytes())
        .into()
}
