use tracing::instrument;
use chrono::{DateTime, Utc};
use super::{locked_out, CredentialStore, INVALID_LOGIN};
use crate::model::{account::{normalize_username, Account}, algorithm::{self, Algorithm}, events::AuditEvent};
use crate::utils::errors::{ErrorCode, CredentialError};

impl CredentialStore {
    ///
    /// Log a family member in.
    ///
    /// A locked account is refused whatever the password. A lock whose time has run out is
    /// cleared here, on access - there is no background timer. Each wrong password for an
    /// unlocked account counts towards the lockout threshold; a correct one resets the count.
    ///
    #[instrument(skip(self, candidate_password))]
    pub async fn authenticate(&self, username: &str, candidate_password: &str) -> Result<Account, CredentialError> {
        let username = normalize_username(username);

        let slot = match self.slot(&username) {
            Some(slot) => slot,
            None => {
                // Reported to the caller exactly like a wrong password.
                tracing::debug!("Login attempted for unknown username '{}'", username);
                return Err(ErrorCode::UnknownAccount.with_msg(INVALID_LOGIN))
            },
        };

        // Serialise every operation on this account so racing attempts can't lose an update.
        let _guard = self.lock_slot(&slot).await?;
        let mut account = slot.snapshot();
        let now = self.now();

        if let Some(remaining) = account.lock_remaining(now) {
            tracing::info!("Login refused for locked account {}", account.id);
            return Err(locked_out(remaining))
        }

        let lock_expired = account.clear_expired_lock(now);

        let valid = self.auth_cache.contains(&username, candidate_password, now)
            || self.verify_password(candidate_password, &account.password_hash, &account.password_salt).await?;

        if !valid {
            let locked = account.record_failure(now, self.policy().max_failures, self.policy().lockout_duration());
            let account = self.persist(&slot, account).await?;

            if lock_expired {
                self.audit(AuditEvent::LockExpired, &account);
            }

            if locked {
                tracing::warn!("Account {} locked after {} failed attempts", account.id, account.failed_login_attempts);
                self.audit(AuditEvent::AccountLockedOut {
                    failed_attempts: account.failed_login_attempts,
                    locked_until: account.account_locked_until.unwrap_or(now),
                }, &account);

                return Err(locked_out(self.policy().lockout_duration()))
            }

            tracing::info!("Wrong password for account {} (attempt {})", account.id, account.failed_login_attempts);
            self.audit(AuditEvent::LoginFailed { failed_attempts: account.failed_login_attempts }, &account);

            return Err(ErrorCode::InvalidCredentials
                .with_msg(INVALID_LOGIN)
                .with_failed_attempts(account.failed_login_attempts))
        }

        account.record_success(now);
        let rehashed_from = self.upgrade_hash(&mut account, candidate_password).await;
        let account = self.persist(&slot, account).await?;

        if lock_expired {
            self.audit(AuditEvent::LockExpired, &account);
        }

        if let Some(from) = rehashed_from {
            self.auth_cache.invalidate(&username);
            self.audit(AuditEvent::PasswordRehashed { from, to: self.policy().algorithm }, &account);
        }

        self.auth_cache.insert(&username, candidate_password, now);
        self.audit(AuditEvent::LoginSucceeded, &account);

        tracing::info!("Account {} logged in", account.id);
        Ok(account)
    }

    ///
    /// If the stored hash isn't using the configured algorithm, re-hash the (now verified)
    /// password with it. This is not a password change so the history is left alone.
    ///
    /// Returns the algorithm migrated from. A failure to re-hash doesn't fail the login.
    ///
    async fn upgrade_hash(&self, account: &mut Account, plain_text_password: &str) -> Option<Algorithm> {
        if !self.policy().needs_rehash(&account.password_hash) {
            return None
        }

        let from = algorithm::select(&account.password_hash).ok()?;

        match self.hash_password(plain_text_password).await {
            Ok(hashed) => {
                account.password_hash = hashed.hash;
                account.password_salt = hashed.salt;
                Some(from)
            },
            Err(err) => {
                tracing::warn!("Unable to upgrade the {} hash for account {}: {}", from, account.id, err);
                None
            },
        }
    }

    ///
    /// The time of the most recent successful login, if any.
    ///
    pub fn last_login(&self, username: &str) -> Option<DateTime<Utc>> {
        self.account(username).and_then(|account| account.last_login_time)
    }
}
