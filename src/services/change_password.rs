use tracing::instrument;
use super::{locked_out, require_self_or_parent, unknown_account, CredentialStore};
use crate::model::{account::{normalize_username, Account}, events::AuditEvent};
use crate::utils::errors::{ErrorCode, CredentialError};

impl CredentialStore {
    ///
    /// Change a password, either as the account owner or as a Parent.
    ///
    /// The owner must supply the correct current password (a Parent changing their own password
    /// is treated as the owner). A Parent changing someone else's password does not need it and
    /// current_password is ignored.
    ///
    #[instrument(skip(self, current_password, new_password, requesting), fields(requested_by = %requesting.username))]
    pub async fn change_password(&self, target_username: &str, current_password: &str, new_password: &str, requesting: &Account)
        -> Result<(), CredentialError> {

        let username = normalize_username(target_username);
        require_self_or_parent(requesting, &username)?;

        let slot = self.slot(&username).ok_or_else(|| unknown_account(&username))?;
        let _guard = self.lock_slot(&slot).await?;
        let mut account = slot.snapshot();

        if !account.can_be_administered_by(requesting) {
            return Err(ErrorCode::PermissionDenied
                .with_msg("Only a parent may manage another family member's password"))
        }

        let now = self.now();

        if account.id == requesting.id {
            // The owner can't use this to keep guessing while locked out.
            if let Some(remaining) = account.lock_remaining(now) {
                return Err(locked_out(remaining))
            }

            // Checked before anything is touched - a wrong current password changes nothing.
            if !self.verify_password(current_password, &account.password_hash, &account.password_salt).await? {
                tracing::info!("Wrong current password given to change the password of account {}", account.id);
                return Err(ErrorCode::InvalidCredentials.with_msg("The current password is not correct"))
            }
        }

        let hashed = self.hash_password(new_password).await?;
        account.apply_new_password(hashed, now, self.policy().max_history_length);

        let account = self.persist(&slot, account).await?;
        self.auth_cache.invalidate(&username);
        self.audit(AuditEvent::PasswordChanged { requested_by: requesting.username.clone() }, &account);

        tracing::info!("Password for account {} changed by {}", account.id, requesting.username);
        Ok(())
    }
}
