pub mod argon;
pub mod bcrypt;
pub mod pbkdf2;
pub mod sha256;

use std::str::FromStr;
use derive_more::Display;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use crate::utils::errors::{ErrorCode, CredentialError};

#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq)]
pub enum Algorithm {
    Argon,
    BCrypt,
    PBKDF2,
    Sha256Legacy,
}

///
/// A freshly hashed password. The hash is self-describing (PHC format) and the salt is the
/// base64 (no padding) encoding of the random bytes mixed into it. They are always stored together.
///
#[derive(Clone, Debug, PartialEq)]
pub struct HashedPassword {
    pub hash: String,
    pub salt: String,
}

///
/// Validate if the plain_text_password matches the hashed password provided.
///
/// The algorithm is constructed and used from the hash string provided.
///
pub fn validate(plain_text_password: &str, hash: &str, salt: &str) -> Result<bool, CredentialError> {
    match select(hash)? {
        Algorithm::Argon        => argon::validate(hash, plain_text_password),
        Algorithm::BCrypt       => self::bcrypt::validate(hash, plain_text_password),
        Algorithm::PBKDF2       => self::pbkdf2::validate(hash, plain_text_password),
        Algorithm::Sha256Legacy => sha256::validate(hash, salt, plain_text_password),
    }
}

///
/// Parse the first part of the hash string and return the algorithm.
///
pub fn select(hash: &str) -> Result<Algorithm, CredentialError> {
    let mut split = hash.split('$');
    split.next(); /* Skip first it's blank */

    match split.next() {
        Some(algorithm) => Algorithm::from_str(algorithm),
        None => Err(ErrorCode::InvalidPHCFormat.with_msg("The hash is invalid, there's no algorithm")),
    }
}

impl FromStr for Algorithm {
    type Err = CredentialError;

    fn from_str(input: &str) -> Result<Algorithm, Self::Err> {
        match input {
            "argon2i"  |
            "argon2d"  |
            "argon2id" => Ok(Algorithm::Argon),

            "2a" |
            "2b" |
            "2x" |
            "2y" => Ok(Algorithm::BCrypt),

            "pbkdf2-sha256" => Ok(Algorithm::PBKDF2),

            sha256::IDENT => Ok(Algorithm::Sha256Legacy),

            _ => Err(ErrorCode::InvalidPHCFormat.with_msg(&format!("algorithm {} is un-handled", input))),
        }
    }
}

impl Algorithm {
    ///
    /// Parse the configured algorithm name (the Display form, any case).
    ///
    pub fn from_name(name: &str) -> Result<Algorithm, CredentialError> {
        [Algorithm::Argon, Algorithm::BCrypt, Algorithm::PBKDF2, Algorithm::Sha256Legacy]
            .iter()
            .find(|algorithm| algorithm.to_string().eq_ignore_ascii_case(name.trim()))
            .copied()
            .ok_or_else(|| ErrorCode::InvalidAlgorithmConfig.with_msg(&format!("Unknown hashing algorithm '{}'", name)))
    }
}

///
/// Fill a salt buffer from the operating system's CSPRNG.
///
pub(crate) fn random_salt<const N: usize>() -> [u8; N] {
    let mut salt = [0u8; N];
    OsRng.fill_bytes(&mut salt);
    salt
}

pub(crate) fn encode_salt(salt: &[u8]) -> String {
    base64::encode_config(salt, base64::STANDARD_NO_PAD)
}

pub(crate) fn decode_b64(value: &str) -> Result<Vec<u8>, CredentialError> {
    base64::decode_config(value, base64::STANDARD_NO_PAD)
        .map_err(|e| ErrorCode::InvalidPHCFormat.with_msg(&format!("Invalid base64 value: {}", e)))
}
