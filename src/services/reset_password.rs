use tracing::instrument;
use super::{require_parent, unknown_account, CredentialStore};
use crate::model::{account::{normalize_username, Account}, events::AuditEvent};
use crate::utils::errors::CredentialError;

impl CredentialStore {
    ///
    /// A Parent sets a new password without knowing the old one. A reset always unlocks too.
    ///
    #[instrument(skip(self, new_password, parent), fields(requested_by = %parent.username))]
    pub async fn reset_password(&self, target_username: &str, new_password: &str, parent: &Account)
        -> Result<(), CredentialError> {

        require_parent(parent, "reset passwords")?;

        let username = normalize_username(target_username);
        let slot = self.slot(&username).ok_or_else(|| unknown_account(&username))?;
        let _guard = self.lock_slot(&slot).await?;
        let mut account = slot.snapshot();
        let now = self.now();

        let hashed = self.hash_password(new_password).await?;
        account.apply_new_password(hashed, now, self.policy().max_history_length);
        account.clear_lockout();

        let account = self.persist(&slot, account).await?;
        self.auth_cache.invalidate(&username);
        self.audit(AuditEvent::PasswordReset { requested_by: parent.username.clone() }, &account);

        tracing::info!("Password for account {} reset by {}", account.id, parent.username);
        Ok(())
    }
}
