pub mod json_file;
pub mod memory;

use async_trait::async_trait;
use crate::model::account::Account;
use crate::utils::errors::CredentialError;

///
/// The durable home of the accounts. The CredentialStore always reads and writes the whole set,
/// and never calls save_all concurrently.
///
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Account>, CredentialError>;

    async fn save_all(&self, accounts: &[Account]) -> Result<(), CredentialError>;
}
