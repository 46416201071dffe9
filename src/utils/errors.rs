use bcrypt::BcryptError;
use chrono::Duration;
use config::ConfigError;
use tokio::task::JoinError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ErrorCode {
    HashThreadingIssue              = 0401,
    PersistenceFailure              = 0503,
    PersistenceTimeout              = 0504, // A PersistenceFailure to callers, see public_code.
    InvalidJSON                     = 0505,
    IOError                         = 0506,
    ConfigError                     = 0507,
    InvalidAlgorithmConfig          = 0508,
    HashingError                    = 0509,
    InvalidPHCFormat                = 0510,
    UnknownAccount                  = 2101,
    AccountLocked                   = 2102,
    InvalidCredentials              = 2103,
    PermissionDenied                = 2300,
    DuplicateUsername               = 2400,
    InvalidUsername                 = 2401,
}

///
/// How a caller is expected to react to a failed operation.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Recovery {
    ClientCorrectable,  // Retry with different input.
    TimeBound,          // Retry after the reported wait.
    RequiresPrivilege,  // Only a different (privileged) identity can succeed.
    Internal,           // Storage, hashing or configuration fault.
}

impl ErrorCode {
    pub fn with_msg(&self, message: &str) -> CredentialError {
        CredentialError::new(*self, message)
    }

    pub fn recovery(&self) -> Recovery {
        use ErrorCode::*;

        match self {
            HashThreadingIssue     |
            PersistenceFailure     |
            PersistenceTimeout     |
            InvalidJSON            |
            IOError                |
            ConfigError            |
            InvalidAlgorithmConfig |
            HashingError           |
            InvalidPHCFormat       => Recovery::Internal,

            UnknownAccount     |
            InvalidCredentials |
            DuplicateUsername  |
            InvalidUsername    => Recovery::ClientCorrectable,

            AccountLocked => Recovery::TimeBound,

            PermissionDenied => Recovery::RequiresPrivilege,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CredentialError {
    error_code: ErrorCode,
    message: String,
    retry_after: Option<Duration>,
    failed_attempts: Option<u32>,
}

impl CredentialError {
    pub fn new(error_code: ErrorCode, message: &str) -> Self {
        CredentialError { error_code, message: message.to_string(), retry_after: None, failed_attempts: None }
    }

    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    ///
    /// The code to surface outside the process. Unknown usernames are reported exactly like a
    /// wrong password so callers cannot probe which accounts exist, and a timed-out wait for
    /// storage is reported as the storage failure it is.
    ///
    pub fn public_code(&self) -> ErrorCode {
        match self.error_code {
            ErrorCode::UnknownAccount     => ErrorCode::InvalidCredentials,
            ErrorCode::PersistenceTimeout => ErrorCode::PersistenceFailure,
            code => code,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    ///
    /// For AccountLocked, how long until authentication will be attempted again.
    ///
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    ///
    /// For InvalidCredentials, the consecutive failure count. Informational only.
    ///
    pub fn failed_attempts(&self) -> Option<u32> {
        self.failed_attempts
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }

    pub fn with_failed_attempts(mut self, failed_attempts: u32) -> Self {
        self.failed_attempts = Some(failed_attempts);
        self
    }
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.error_code as u32, self.message)
    }
}

impl std::error::Error for CredentialError {}

impl From<argon2::Error> for CredentialError {
    fn from(error: argon2::Error) -> Self {
        ErrorCode::InvalidAlgorithmConfig.with_msg(&format!("Invalid configuration for algorithm: {}", error))
    }
}

impl From<password_hash::Error> for CredentialError {
    fn from(error: password_hash::Error) -> Self {
        ErrorCode::HashingError.with_msg(&format!("Unable to hash password: {}", error))
    }
}

impl From<BcryptError> for CredentialError {
    fn from(error: BcryptError) -> Self {
        ErrorCode::HashingError.with_msg(&format!("Unable to hash or verify with bcrypt: {}", error))
    }
}

impl From<serde_json::Error> for CredentialError {
    fn from(error: serde_json::Error) -> Self {
        ErrorCode::InvalidJSON.with_msg(&format!("Unable to convert to/from json: {}", error))
    }
}

impl From<std::io::Error> for CredentialError {
    fn from(error: std::io::Error) -> Self {
        ErrorCode::IOError.with_msg(&format!("IO error: {}", error))
    }
}

impl From<JoinError> for CredentialError {
    fn from(error: JoinError) -> Self {
        ErrorCode::HashThreadingIssue.with_msg(&format!("Unable to hash: {}", error))
    }
}

impl From<ConfigError> for CredentialError {
    fn from(error: ConfigError) -> Self {
        ErrorCode::ConfigError.with_msg(&format!("The configuration is not valid: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_account_is_hidden_publicly() {
        let err = ErrorCode::UnknownAccount.with_msg("Invalid username or password");
        assert_eq!(err.error_code(), ErrorCode::UnknownAccount);
        assert_eq!(err.public_code(), ErrorCode::InvalidCredentials);
    }

    #[test]
    fn test_timeouts_are_reported_as_persistence_failures() {
        let err = ErrorCode::PersistenceTimeout.with_msg("Timed out after 50ms waiting to save accounts");
        assert_eq!(err.error_code(), ErrorCode::PersistenceTimeout);
        assert_eq!(err.public_code(), ErrorCode::PersistenceFailure);
        assert_eq!(ErrorCode::PermissionDenied.with_msg("nope").public_code(), ErrorCode::PermissionDenied);
    }

    #[test]
    fn test_recovery_classification() {
        assert_eq!(ErrorCode::InvalidCredentials.recovery(), Recovery::ClientCorrectable);
        assert_eq!(ErrorCode::UnknownAccount.recovery(), Recovery::ClientCorrectable);
        assert_eq!(ErrorCode::AccountLocked.recovery(), Recovery::TimeBound);
        assert_eq!(ErrorCode::PermissionDenied.recovery(), Recovery::RequiresPrivilege);
        assert_eq!(ErrorCode::PersistenceFailure.recovery(), Recovery::Internal);
    }

    #[test]
    fn test_display_includes_numeric_code() {
        let err = ErrorCode::PermissionDenied.with_msg("nope");
        assert_eq!(err.to_string(), "[2300] nope");
    }
}
