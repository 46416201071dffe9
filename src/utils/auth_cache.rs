use std::collections::HashMap;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use chrono::{DateTime, Duration, Utc};
use crate::model::algorithm::random_salt;

type Fingerprint = [u8; 32];

///
/// Remembers recent successful logins so a repeat login can skip the password hash.
///
/// Passwords are never held: entries are keyed on a SHA-256 of a per-process random key and
/// the password. The cache is only a shortcut for verification, lockout is always decided from
/// the account record.
///
pub struct AuthCache {
    key: [u8; 32],
    ttl: Duration,
    entries: Mutex<HashMap<(String, Fingerprint), DateTime<Utc>>>,
}

impl AuthCache {
    pub fn new(ttl: Duration) -> Self {
        AuthCache { key: random_salt(), ttl, entries: Mutex::new(HashMap::new()) }
    }

    fn enabled(&self) -> bool {
        self.ttl > Duration::zero()
    }

    fn fingerprint(&self, password: &str) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update(self.key);
        hasher.update(password.as_bytes());

        let mut fingerprint = [0u8; 32];
        fingerprint.copy_from_slice(&hasher.finalize());
        fingerprint
    }

    ///
    /// True if this username and password succeeded within the TTL. Expired entries are dropped.
    ///
    pub fn contains(&self, username: &str, password: &str, now: DateTime<Utc>) -> bool {
        if !self.enabled() {
            return false
        }

        let key = (username.to_string(), self.fingerprint(password));
        let mut entries = self.entries.lock();

        match entries.get(&key).copied() {
            Some(expires) if expires > now => true,
            Some(_) => {
                entries.remove(&key);
                false
            },
            None => false,
        }
    }

    pub fn insert(&self, username: &str, password: &str, now: DateTime<Utc>) {
        if !self.enabled() {
            return
        }

        let key = (username.to_string(), self.fingerprint(password));
        let mut entries = self.entries.lock();
        entries.retain(|_, expires| *expires > now);
        entries.insert(key, now + self.ttl);
    }

    ///
    /// Forget every cached login for the user - called whenever their password changes.
    ///
    pub fn invalidate(&self, username: &str) {
        self.entries.lock().retain(|(cached, _), _| cached != username);
    }
}
