use pbkdf2::Pbkdf2;
use serde::{Deserialize, Serialize};
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use super::{random_salt, HashedPassword};
use crate::utils::errors::CredentialError;

const SALT_LEN: usize = 32;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PBKDF2Policy {
    pub cost: u32,
    pub dk_len: u32, // Derived key length in bytes.
}

impl Default for PBKDF2Policy {
    fn default() -> Self {
        Self {
            cost: 600_000,
            dk_len: 32,
        }
    }
}

impl PBKDF2Policy {
    pub fn hash_into_phc(&self, plain_text_password: &str) -> Result<HashedPassword, CredentialError> {
        let salt = SaltString::encode_b64(&random_salt::<SALT_LEN>())?;
        let params = pbkdf2::Params {
            rounds: self.cost,
            output_length: self.dk_len as usize,
        };

        // Hash password to PHC string ($pbkdf2-sha256$...)
        let hash = Pbkdf2.hash_password_customized(
            plain_text_password.as_bytes(),
            None,
            None,
            params,
            &salt)?.to_string();

        Ok(HashedPassword { hash, salt: salt.as_str().to_string() })
    }
}


pub fn validate(phc: &str, plain_text_password: &str) -> Result<bool, CredentialError> {
    let parsed_hash = PasswordHash::new(phc)?;
    Ok(Pbkdf2.verify_password(plain_text_password.as_bytes(), &parsed_hash).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_hash_and_verify() -> Result<(), CredentialError> {
        let pbkdf2 = PBKDF2Policy { cost: 1000, ..PBKDF2Policy::default() };
        let hashed = pbkdf2.hash_into_phc("wibble")?;

        assert!(hashed.hash.starts_with("$pbkdf2-sha256$"));
        assert_eq!(validate(&hashed.hash, "wibble")?, true);
        assert_eq!(validate(&hashed.hash, "wobble")?, false);
        Ok(())
    }
}
