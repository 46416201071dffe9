use tracing::instrument;
use super::{duplicate_username, CredentialStore};
use crate::model::{account::{normalize_username, Account, Role}, events::AuditEvent};
use crate::utils::{self, errors::{ErrorCode, CredentialError}};

impl CredentialStore {
    ///
    /// Create a family member's account with a freshly hashed password.
    ///
    #[instrument(skip(self, password))]
    pub async fn provision_account(&self, username: &str, password: &str, role: Role) -> Result<Account, CredentialError> {
        let normalized = normalize_username(username);

        if normalized.is_empty() {
            return Err(ErrorCode::InvalidUsername.with_msg("A username is required"))
        }

        // Cheap early exit, persist_new re-checks under the write lock.
        if self.slot(&normalized).is_some() {
            return Err(duplicate_username(&normalized))
        }

        let hashed = self.hash_password(password).await?;
        let account = Account::new(utils::generate_id(), username, role, hashed, self.now());
        let account = self.persist_new(account).await?;

        self.audit(AuditEvent::AccountProvisioned { role }, &account);
        tracing::info!("Provisioned {} account {} for {}", role, account.id, account.username);

        Ok(account)
    }
}
