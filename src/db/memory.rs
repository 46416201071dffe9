use parking_lot::Mutex;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use super::AccountRepository;
use crate::model::account::Account;
use crate::utils::errors::{ErrorCode, CredentialError};

///
/// Keeps the accounts in process memory. Saves can be made to fail on demand, which lets callers
/// exercise their handling of storage faults.
///
#[derive(Debug, Default)]
pub struct MemoryRepository {
    accounts: Mutex<Vec<Account>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryRepository {
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        MemoryRepository { accounts: Mutex::new(accounts), ..Default::default() }
    }

    ///
    /// The accounts as they were last saved.
    ///
    pub fn saved(&self) -> Vec<Account> {
        self.accounts.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountRepository for MemoryRepository {
    async fn load_all(&self) -> Result<Vec<Account>, CredentialError> {
        Ok(self.accounts.lock().clone())
    }

    async fn save_all(&self, accounts: &[Account]) -> Result<(), CredentialError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ErrorCode::IOError.with_msg("The in-memory repository is set to fail saves"))
        }

        *self.accounts.lock() = accounts.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
