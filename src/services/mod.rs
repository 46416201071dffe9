mod account_status;
mod authenticate;
mod change_password;
mod hash_password;
mod provision_account;
mod reset_password;
mod unlock_account;

use parking_lot::RwLock;
use chrono::{DateTime, Duration, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, MutexGuard};
use crate::db::AccountRepository;
use crate::model::{account::{normalize_username, Account}, events::AuditEvent, policy::CredentialPolicy};
use crate::utils::{audit::AuditSink, auth_cache::AuthCache, errors::{ErrorCode, CredentialError}, time_provider::TimeProvider};

///
/// The message for both an unknown username and a wrong password.
///
pub(crate) const INVALID_LOGIN: &str = "Invalid username or password";

///
/// One account's committed record plus the lock that serialises operations on it.
///
/// The record lock is only ever held briefly (never across an await) so a save can snapshot
/// every account while other accounts are mid-operation.
///
pub(crate) struct AccountSlot {
    guard: Mutex<()>,
    record: RwLock<Account>,
}

impl AccountSlot {
    fn new(account: Account) -> Arc<Self> {
        Arc::new(AccountSlot { guard: Mutex::new(()), record: RwLock::new(account) })
    }

    pub(crate) fn snapshot(&self) -> Account {
        self.record.read().clone()
    }

    fn commit(&self, account: Account) {
        *self.record.write() = account;
    }
}

///
/// Authenticates family members and manages the lifecycle of their credentials.
///
/// Construct one per process and share it (e.g. in an Arc) with every caller.
///
pub struct CredentialStore {
    index: RwLock<HashMap<String, Arc<AccountSlot>>>, // Normalized username -> account.
    repository: Arc<dyn AccountRepository>,
    audit: Arc<dyn AuditSink>,
    policy: CredentialPolicy,
    write_lock: Mutex<()>,
    auth_cache: AuthCache,
    time_provider: RwLock<TimeProvider>,
}

impl CredentialStore {
    ///
    /// Load every account from the repository and build the username index.
    ///
    pub async fn open(repository: Arc<dyn AccountRepository>, audit: Arc<dyn AuditSink>, policy: CredentialPolicy)
        -> Result<Self, CredentialError> {

        let accounts = repository.load_all()
            .await
            .map_err(|err| persistence_failure("load", &err))?;

        let mut index = HashMap::new();
        for account in accounts {
            let username = account.normalized_username();
            if index.contains_key(&username) {
                return Err(ErrorCode::DuplicateUsername
                    .with_msg(&format!("The username '{}' is stored more than once", username)))
            }
            index.insert(username, AccountSlot::new(account));
        }

        tracing::info!("Loaded {} accounts", index.len());

        Ok(CredentialStore {
            index: RwLock::new(index),
            repository,
            audit,
            auth_cache: AuthCache::new(policy.auth_cache_ttl()),
            policy,
            write_lock: Mutex::new(()),
            time_provider: RwLock::new(TimeProvider::default()),
        })
    }

    pub fn policy(&self) -> &CredentialPolicy {
        &self.policy
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.time_provider.read().now()
    }

    ///
    /// Fix the store's clock at the time given, or release it back to the system clock with None.
    ///
    pub fn set_now(&self, now: Option<DateTime<Utc>>) {
        self.time_provider.write().fix(now);
        match now {
            Some(now) => tracing::info!("TimeProvider fixed to {:?}", now),
            None => tracing::info!("TimeProvider no-longer fixed"),
        }
    }

    ///
    /// A copy of the account as currently committed.
    ///
    pub fn account(&self, username: &str) -> Option<Account> {
        self.slot(&normalize_username(username)).map(|slot| slot.snapshot())
    }

    ///
    /// A copy of every account, ordered by username.
    ///
    pub fn accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.index.read()
            .values()
            .map(|slot| slot.snapshot())
            .collect();

        accounts.sort_by_key(|account| account.normalized_username());
        accounts
    }

    pub(crate) fn slot(&self, normalized_username: &str) -> Option<Arc<AccountSlot>> {
        self.index.read().get(normalized_username).cloned()
    }

    ///
    /// Save the full account set with the updated record substituted, then commit it in memory.
    ///
    /// If the save fails (or the write lock can't be had in time) the committed record is left
    /// untouched. Callers must hold the slot's lock.
    ///
    pub(crate) async fn persist(&self, slot: &AccountSlot, updated: Account) -> Result<Account, CredentialError> {
        let _write = self.acquire_write_lock().await?;
        self.save_with(&updated).await?;
        slot.commit(updated.clone());
        Ok(updated)
    }

    ///
    /// Save and index a brand new account, refusing a username that's already taken.
    ///
    pub(crate) async fn persist_new(&self, account: Account) -> Result<Account, CredentialError> {
        let username = account.normalized_username();
        let _write = self.acquire_write_lock().await?;

        // New slots are only indexed under the write lock, so this check can't race.
        if self.index.read().contains_key(&username) {
            return Err(duplicate_username(&username))
        }

        self.save_with(&account).await?;
        self.index.write().insert(username, AccountSlot::new(account.clone()));
        Ok(account)
    }

    ///
    /// Wait for the account's other operations to finish, for no longer than the persistence
    /// timeout. The holder keeps the lock for the whole of its save.
    ///
    pub(crate) async fn lock_slot<'a>(&self, slot: &'a AccountSlot) -> Result<MutexGuard<'a, ()>, CredentialError> {
        tokio::time::timeout(self.policy.persistence_timeout(), slot.guard.lock())
            .await
            .map_err(|_| {
                tracing::error!("Timed out after {}ms waiting for the account", self.policy.persistence_timeout_ms);
                ErrorCode::PersistenceTimeout
                    .with_msg(&format!("Timed out after {}ms waiting for the account", self.policy.persistence_timeout_ms))
            })
    }

    async fn acquire_write_lock(&self) -> Result<MutexGuard<'_, ()>, CredentialError> {
        tokio::time::timeout(self.policy.persistence_timeout(), self.write_lock.lock())
            .await
            .map_err(|_| {
                tracing::error!("Timed out after {}ms waiting to save accounts", self.policy.persistence_timeout_ms);
                ErrorCode::PersistenceTimeout
                    .with_msg(&format!("Timed out after {}ms waiting to save accounts", self.policy.persistence_timeout_ms))
            })
    }

    // The caller must hold the write lock.
    async fn save_with(&self, updated: &Account) -> Result<(), CredentialError> {
        let snapshot = {
            let index = self.index.read();
            let mut accounts: Vec<Account> = index.values()
                .map(|slot| slot.snapshot())
                .filter(|account| account.id != updated.id)
                .collect();

            accounts.push(updated.clone());
            accounts.sort_by_key(|account| account.normalized_username());
            accounts
        };

        self.repository.save_all(&snapshot)
            .await
            .map_err(|err| persistence_failure("save", &err))
    }

    ///
    /// Hand the event to the audit collaborator. A failure is logged, never returned.
    ///
    pub(crate) fn audit(&self, event: AuditEvent, account: &Account) {
        if let Err(err) = self.audit.record(&event, account) {
            tracing::warn!("Unable to audit '{}' for account {}: {}", event.description(), account.id, err);
        }
    }
}

fn persistence_failure(action: &str, err: &CredentialError) -> CredentialError {
    tracing::error!("Unable to {} accounts: {}", action, err);
    ErrorCode::PersistenceFailure.with_msg(&format!("Unable to {} accounts: {}", action, err.message()))
}

pub(crate) fn unknown_account(username: &str) -> CredentialError {
    ErrorCode::UnknownAccount.with_msg(&format!("The account '{}' does not exist", username))
}

pub(crate) fn duplicate_username(username: &str) -> CredentialError {
    ErrorCode::DuplicateUsername.with_msg(&format!("The username '{}' is already taken", username))
}

pub(crate) fn locked_out(remaining: Duration) -> CredentialError {
    // Round up so a caller is never told to wait 0 minutes.
    let minutes = (remaining.num_milliseconds() + 59_999) / 60_000;

    ErrorCode::AccountLocked
        .with_msg(&format!("Too many failed attempts, the account is locked for {} more minute(s)", minutes))
        .with_retry_after(remaining)
}

///
/// Administrative operations are only open to the Parent role.
///
pub(crate) fn require_parent(requesting: &Account, action: &str) -> Result<(), CredentialError> {
    if requesting.is_parent() {
        return Ok(())
    }

    tracing::warn!("{} ({}) is not permitted to {}", requesting.username, requesting.role, action);
    Err(ErrorCode::PermissionDenied.with_msg(&format!("Only a parent may {}", action)))
}

///
/// Non-parents may only act on themselves. Checked before the target is looked up so the
/// answer doesn't reveal whether the target exists.
///
pub(crate) fn require_self_or_parent(requesting: &Account, normalized_target: &str) -> Result<(), CredentialError> {
    if requesting.is_parent() || requesting.normalized_username() == normalized_target {
        return Ok(())
    }

    tracing::warn!("{} ({}) is not permitted to manage another account", requesting.username, requesting.role);
    Err(ErrorCode::PermissionDenied.with_msg("Only a parent may manage another family member's password"))
}
