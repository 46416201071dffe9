use std::fmt::Write;
use std::env::VarError;
use config::ConfigError;
use serde::{Deserialize, Serialize};
use super::errors::CredentialError;

const ENV_PREFIX: &str = "FAMILY_AUTH";

const DEFAULT_ACCOUNTS_FILE: &str = "accounts.json";
const DEFAULT_MAX_FAILURES: u32 = 3;
const DEFAULT_LOCKOUT_SECONDS: u32 = 15 * 60;
const DEFAULT_MAX_HISTORY_LENGTH: u32 = 10;
const DEFAULT_AUTH_CACHE_SECONDS: u32 = 5 * 60;
const DEFAULT_PERSISTENCE_TIMEOUT_MS: u64 = 5000;
const DEFAULT_ALGORITHM: &str = "Argon";

///
/// The store configuration - initialised at start-up from FAMILY_AUTH_* environment variables.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Configuration {
    pub accounts_file: String,             // The JSON file the accounts are persisted to.
    pub max_failures: u32,                 // Consecutive failed logins before an account is locked.
    pub lockout_seconds: u32,              // How long a lockout lasts.
    pub max_history_length: u32,           // How many password-change timestamps are retained.
    pub auth_cache_seconds: u32,           // TTL of cached successful logins, 0 disables the cache.
    pub persistence_timeout_ms: u64,       // Longest wait for the persistence write lock.
    pub algorithm: String,                 // Argon, BCrypt or PBKDF2 - used for new hashes.
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            accounts_file: DEFAULT_ACCOUNTS_FILE.to_string(),
            max_failures: DEFAULT_MAX_FAILURES,
            lockout_seconds: DEFAULT_LOCKOUT_SECONDS,
            max_history_length: DEFAULT_MAX_HISTORY_LENGTH,
            auth_cache_seconds: DEFAULT_AUTH_CACHE_SECONDS,
            persistence_timeout_ms: DEFAULT_PERSISTENCE_TIMEOUT_MS,
            algorithm: DEFAULT_ALGORITHM.to_string(),
        }
    }
}

impl Configuration {
    ///
    /// Load the store's configuration.
    ///
    pub fn from_env() -> Result<Configuration, ConfigError> {
        let mut cfg = config::Config::default();

        // Merge any prefixed environment variables with the same name as the struct fields.
        cfg.merge(config::Environment::with_prefix(ENV_PREFIX))?;

        // Set defaults for settings that were not specified.
        cfg.set_default("accounts_file", DEFAULT_ACCOUNTS_FILE)?;
        cfg.set_default("max_failures", DEFAULT_MAX_FAILURES as i64)?;
        cfg.set_default("lockout_seconds", DEFAULT_LOCKOUT_SECONDS as i64)?;
        cfg.set_default("max_history_length", DEFAULT_MAX_HISTORY_LENGTH as i64)?;
        cfg.set_default("auth_cache_seconds", DEFAULT_AUTH_CACHE_SECONDS as i64)?;
        cfg.set_default("persistence_timeout_ms", DEFAULT_PERSISTENCE_TIMEOUT_MS as i64)?;
        cfg.set_default("algorithm", DEFAULT_ALGORITHM)?;

        let config: Configuration = cfg.try_into()?;

        Ok(config)
    }

    ///
    /// Pretty-print the config, one sorted key per line.
    ///
    pub fn fmt_console(&self) -> Result<String, CredentialError> {
        // Serialise to JSON so we have fields to iterate.
        let values = serde_json::to_value(&self)?;

        let mut sorted: Vec<_> = match values.as_object() {
            Some(values) => values.iter().collect(),
            None => Vec::new(),
        };
        sorted.sort_by_key(|a| a.0);

        let mut output = String::new();
        for (k, v) in sorted {
            let _ = writeln!(&mut output, "{:>23}: {}", k, v);
        }

        Ok(output)
    }
}

///
/// If the specified environment variable is not set for this process, set it to the default value specified.
///
pub fn default_env(key: &str, value: &str) {
    if let Err(VarError::NotPresent) = std::env::var(key) {
        std::env::set_var(key, value);
    }
}
