use derive_more::Display;
use serde::{Deserialize, Serialize};
use argon2::{Argon2, Params, Version};
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use super::{random_salt, HashedPassword};
use crate::utils::errors::CredentialError;

const SALT_LEN: usize = 32;

#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq)]
pub enum ArgonHashType {
    ARGON2D,
    ARGON2I,
    ARGON2ID
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ArgonPolicy {
    pub parallelism: u32,
    pub tag_length: u32,
    pub memory_size_kb: u32,
    pub iterations: u32,
    pub hash_type: ArgonHashType
}


pub fn validate(phc: &str, plain_text_password: &str) -> Result<bool, CredentialError> {
    let parsed_hash = PasswordHash::new(phc)?;
    Ok(Argon2::default().verify_password(plain_text_password.as_bytes(), &parsed_hash).is_ok())
}


impl Default for ArgonPolicy {
    fn default() -> Self {
        ArgonPolicy {
            parallelism: 1,
            tag_length: 32,
            memory_size_kb: 19 * 1024,
            iterations: 2,
            hash_type: ArgonHashType::ARGON2ID
        }
    }
}

impl ArgonPolicy {
    pub fn hash_into_phc(&self, plain_text_password: &str) -> Result<HashedPassword, CredentialError> {
        let salt = SaltString::encode_b64(&random_salt::<SALT_LEN>())?;

        let params = Params::new(
            self.memory_size_kb,
            self.iterations,
            self.parallelism,
            Some(self.tag_length as usize))?;

        let argon2 = Argon2::new(self.hash_type.into(), Version::V0x13, params);

        // Hash password to PHC string ($argon2id$v=19$...)
        let hash = argon2.hash_password(plain_text_password.as_bytes(), &salt)?.to_string();

        Ok(HashedPassword { hash, salt: salt.as_str().to_string() })
    }
}

impl From<ArgonHashType> for argon2::Algorithm {
    fn from(hash_type: ArgonHashType) -> Self {
        match hash_type {
            ArgonHashType::ARGON2D  => argon2::Algorithm::Argon2d,
            ArgonHashType::ARGON2I  => argon2::Algorithm::Argon2i,
            ArgonHashType::ARGON2ID => argon2::Algorithm::Argon2id,
        }
    }
}
