//! The legacy salted SHA-256 scheme: `SHA-256(password || salt)`.
//!
//! Hashes are stored as `$sha256$<digest b64>` so they can be told apart from PHC strings.
//! New passwords should not use it; accounts carrying one are re-hashed with the configured
//! algorithm on their next successful login.

use sha2::{Digest, Sha256};
use password_hash::Output;
use super::{decode_b64, encode_salt, random_salt, HashedPassword};
use crate::utils::errors::{ErrorCode, CredentialError};

pub const IDENT: &str = "sha256";

const SALT_LEN: usize = 32;

pub fn hash_into_phc(plain_text_password: &str) -> HashedPassword {
    let salt = random_salt::<SALT_LEN>();
    let digest = digest(plain_text_password, &salt);

    HashedPassword {
        hash: format!("${}${}", IDENT, encode_salt(&digest)),
        salt: encode_salt(&salt),
    }
}

pub fn validate(hash: &str, salt: &str, plain_text_password: &str) -> Result<bool, CredentialError> {
    let expected = match hash.strip_prefix(&format!("${}$", IDENT)) {
        Some(encoded) => decode_b64(encoded)?,
        None => return Err(ErrorCode::InvalidPHCFormat.with_msg("The hash is not a legacy sha256 hash")),
    };

    let actual = digest(plain_text_password, &decode_b64(salt)?);

    // Output's equality is constant-time.
    Ok(Output::new(&expected)? == Output::new(&actual)?)
}

fn digest(plain_text_password: &str, salt: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(plain_text_password.as_bytes());
    hasher.update(salt);
    hasher.finalize().to_vec()
}
