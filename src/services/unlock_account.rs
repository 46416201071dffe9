use tracing::instrument;
use super::{require_parent, unknown_account, CredentialStore};
use crate::model::{account::{normalize_username, Account}, events::AuditEvent};
use crate::utils::errors::CredentialError;

impl CredentialStore {
    ///
    /// A Parent lifts a lockout early. The password is left as it is.
    ///
    #[instrument(skip(self, parent), fields(requested_by = %parent.username))]
    pub async fn unlock_account(&self, target_username: &str, parent: &Account) -> Result<(), CredentialError> {
        require_parent(parent, "unlock accounts")?;

        let username = normalize_username(target_username);
        let slot = self.slot(&username).ok_or_else(|| unknown_account(&username))?;
        let _guard = self.lock_slot(&slot).await?;
        let mut account = slot.snapshot();

        account.clear_lockout();

        let account = self.persist(&slot, account).await?;
        self.audit(AuditEvent::AccountUnlocked { requested_by: parent.username.clone() }, &account);

        tracing::info!("Account {} unlocked by {}", account.id, parent.username);
        Ok(())
    }
}
