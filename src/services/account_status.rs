use tracing::instrument;
use chrono::{DateTime, Utc};
use super::{require_self_or_parent, unknown_account, CredentialStore};
use crate::model::{account::{normalize_username, Account}, events::AuditEvent};
use crate::utils::errors::{ErrorCode, CredentialError};

impl CredentialStore {
    ///
    /// Is the account currently refusing logins? A pure read: an expired lock reads as unlocked
    /// but stays recorded until clear_expired_lock or the next authenticate clears it.
    ///
    /// Unknown usernames read as unlocked.
    ///
    pub fn is_account_locked(&self, username: &str) -> bool {
        let now = self.now();

        self.account(username)
            .map(|account| account.is_locked(now))
            .unwrap_or(false)
    }

    ///
    /// Clear the lock (and failure count) of an account whose lockout has run out.
    ///
    /// Returns true if a lock was cleared.
    ///
    #[instrument(skip(self))]
    pub async fn clear_expired_lock(&self, username: &str) -> Result<bool, CredentialError> {
        let username = normalize_username(username);
        let slot = self.slot(&username).ok_or_else(|| unknown_account(&username))?;
        let _guard = self.lock_slot(&slot).await?;
        let mut account = slot.snapshot();

        if !account.clear_expired_lock(self.now()) {
            return Ok(false)
        }

        let account = self.persist(&slot, account).await?;
        self.audit(AuditEvent::LockExpired, &account);
        Ok(true)
    }

    ///
    /// When the password was changed, oldest first. Visible to the owner and to Parents.
    ///
    pub fn get_password_change_history(&self, target_username: &str, requesting: &Account)
        -> Result<Vec<DateTime<Utc>>, CredentialError> {

        let username = normalize_username(target_username);
        require_self_or_parent(requesting, &username)?;

        let account = self.account(&username).ok_or_else(|| unknown_account(&username))?;

        if !account.can_be_administered_by(requesting) {
            return Err(ErrorCode::PermissionDenied
                .with_msg("Only a parent may view another family member's password history"))
        }

        Ok(account.password_change_history)
    }
}
