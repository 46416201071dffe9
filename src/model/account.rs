use derive_more::Display;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use super::algorithm::HashedPassword;

#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq, Eq)]
pub enum Role {
    Parent,
    Teen,
    Child,
}

///
/// A family member's stored identity and credential state.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
    pub role: Role,
    pub failed_login_attempts: u32,
    pub account_locked_until: Option<DateTime<Utc>>,
    pub last_password_change_time: DateTime<Utc>,
    pub password_change_history: Vec<DateTime<Utc>>,
    pub last_login_time: Option<DateTime<Utc>>,
    pub created_on: DateTime<Utc>,
}

///
/// Usernames are matched case-insensitively, ignoring surrounding whitespace.
///
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

impl Account {
    pub fn new(id: String, username: &str, role: Role, password: HashedPassword, now: DateTime<Utc>) -> Self {
        Account {
            id,
            username: username.trim().to_string(),
            password_hash: password.hash,
            password_salt: password.salt,
            role,
            failed_login_attempts: 0,
            account_locked_until: None,
            last_password_change_time: now,
            password_change_history: vec!(now),
            last_login_time: None,
            created_on: now,
        }
    }

    pub fn normalized_username(&self) -> String {
        normalize_username(&self.username)
    }

    pub fn is_parent(&self) -> bool {
        self.role == Role::Parent
    }

    ///
    /// Self-service or Parent. Anyone else is refused.
    ///
    pub fn can_be_administered_by(&self, requesting: &Account) -> bool {
        requesting.id == self.id || requesting.is_parent()
    }

    ///
    /// A lock only counts while its expiry is in the future, the stored value is advisory.
    ///
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_remaining(now).is_some()
    }

    pub fn lock_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self.account_locked_until {
            Some(locked_until) if locked_until > now => Some(locked_until - now),
            _ => None,
        }
    }

    ///
    /// True if a lock is still recorded but its time has passed.
    ///
    pub fn has_expired_lock(&self, now: DateTime<Utc>) -> bool {
        matches!(self.account_locked_until, Some(locked_until) if locked_until <= now)
    }

    ///
    /// Drop a lock whose time has passed, along with the failure count that caused it.
    /// Returns true if there was one to clear.
    ///
    pub fn clear_expired_lock(&mut self, now: DateTime<Utc>) -> bool {
        if !self.has_expired_lock(now) {
            return false
        }

        self.clear_lockout();
        true
    }

    pub fn clear_lockout(&mut self) {
        self.failed_login_attempts = 0;
        self.account_locked_until = None;
    }

    ///
    /// Count a wrong password. Returns true if this failure locked the account.
    ///
    pub fn record_failure(&mut self, now: DateTime<Utc>, max_failures: u32, lockout: Duration) -> bool {
        self.failed_login_attempts += 1;

        if self.failed_login_attempts >= max_failures {
            self.account_locked_until = Some(now + lockout);
            return true
        }

        false
    }

    pub fn record_success(&mut self, now: DateTime<Utc>) {
        self.failed_login_attempts = 0;
        self.account_locked_until = None;
        self.last_login_time = Some(now);
    }

    ///
    /// Replace the password and stamp the change, keeping only the newest max_history entries.
    ///
    pub fn apply_new_password(&mut self, password: HashedPassword, now: DateTime<Utc>, max_history: u32) {
        self.password_hash = password.hash;
        self.password_salt = password.salt;
        self.last_password_change_time = now;
        self.password_change_history.push(now);

        let max_history = max_history as usize;
        if self.password_change_history.len() > max_history {
            let excess = self.password_change_history.len() - max_history;
            self.password_change_history.drain(..excess);
        }
    }
}
