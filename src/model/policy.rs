use chrono::Duration;
use serde::{Deserialize, Serialize};
use crate::utils::config::Configuration;
use crate::utils::errors::CredentialError;
use super::algorithm::{self, argon::ArgonPolicy, bcrypt::BCryptPolicy, pbkdf2::PBKDF2Policy, sha256, Algorithm, HashedPassword};

///
/// The lockout, retention and hashing rules the CredentialStore enforces.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CredentialPolicy {
    pub max_failures: u32,
    pub lockout_seconds: u32,
    pub max_history_length: u32,
    pub auth_cache_seconds: u32,
    pub persistence_timeout_ms: u64,
    pub algorithm: Algorithm,
    pub argon_policy: ArgonPolicy,
    pub bcrypt_policy: BCryptPolicy,
    pub pbkdf2_policy: PBKDF2Policy,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        let config = Configuration::default();
        CredentialPolicy {
            max_failures: config.max_failures,
            lockout_seconds: config.lockout_seconds,
            max_history_length: config.max_history_length,
            auth_cache_seconds: config.auth_cache_seconds,
            persistence_timeout_ms: config.persistence_timeout_ms,
            algorithm: Algorithm::Argon,
            argon_policy: ArgonPolicy::default(),
            bcrypt_policy: BCryptPolicy::default(),
            pbkdf2_policy: PBKDF2Policy::default(),
        }
    }
}

impl TryFrom<&Configuration> for CredentialPolicy {
    type Error = CredentialError;

    fn try_from(config: &Configuration) -> Result<Self, Self::Error> {
        Ok(CredentialPolicy {
            max_failures: config.max_failures,
            lockout_seconds: config.lockout_seconds,
            max_history_length: config.max_history_length,
            auth_cache_seconds: config.auth_cache_seconds,
            persistence_timeout_ms: config.persistence_timeout_ms,
            algorithm: Algorithm::from_name(&config.algorithm)?,
            ..CredentialPolicy::default()
        })
    }
}

impl CredentialPolicy {
    pub fn lockout_duration(&self) -> Duration {
        Duration::seconds(self.lockout_seconds as i64)
    }

    pub fn auth_cache_ttl(&self) -> Duration {
        Duration::seconds(self.auth_cache_seconds as i64)
    }

    pub fn persistence_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.persistence_timeout_ms)
    }

    ///
    /// Use the configured hashing algorithm to hash the password with a fresh salt.
    ///
    /// This is CPU-bound - async callers should run it on the blocking thread pool.
    ///
    pub fn hash(&self, plain_text_password: &str) -> Result<HashedPassword, CredentialError> {
        match self.algorithm {
            Algorithm::Argon        => self.argon_policy.hash_into_phc(plain_text_password),
            Algorithm::BCrypt       => self.bcrypt_policy.hash_into_phc(plain_text_password),
            Algorithm::PBKDF2       => self.pbkdf2_policy.hash_into_phc(plain_text_password),
            Algorithm::Sha256Legacy => Ok(sha256::hash_into_phc(plain_text_password)),
        }
    }

    ///
    /// True if the stored hash was produced by a different algorithm than the one configured.
    ///
    pub fn needs_rehash(&self, hash: &str) -> bool {
        match algorithm::select(hash) {
            Ok(algorithm) => algorithm != self.algorithm,
            Err(_) => false,
        }
    }
}
