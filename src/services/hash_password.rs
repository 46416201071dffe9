use super::CredentialStore;
use crate::model::algorithm::{self, HashedPassword};
use crate::utils::errors::CredentialError;

impl CredentialStore {
    ///
    /// Hash the password with the configured algorithm and a fresh CSPRNG salt.
    ///
    /// This is a highly CPU-bound activity so it's performed in the blocking thread pool rather
    /// than on the async workers.
    ///
    pub async fn hash_password(&self, plain_text_password: &str) -> Result<HashedPassword, CredentialError> {
        let policy = self.policy().clone();
        let plain_text_password = plain_text_password.to_string();

        Ok(tokio::task::spawn_blocking(move || policy.hash(&plain_text_password)).await??)
    }

    ///
    /// Check the password against a stored hash and salt. The algorithm is taken from the hash.
    ///
    pub async fn verify_password(&self, plain_text_password: &str, hash: &str, salt: &str) -> Result<bool, CredentialError> {
        let plain_text_password = plain_text_password.to_string();
        let hash = hash.to_string();
        let salt = salt.to_string();

        Ok(tokio::task::spawn_blocking(move || algorithm::validate(&plain_text_password, &hash, &salt)).await??)
    }
}
