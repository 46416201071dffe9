use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::{account::Role, algorithm::Algorithm};

///
/// Activity recorded against an account and handed to the audit collaborator.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "event")]
pub enum AuditEvent {
    ///
    /// A new account was created.
    ///
    AccountProvisioned { role: Role },

    LoginSucceeded,

    ///
    /// A wrong password was given for an unlocked account.
    ///
    LoginFailed { failed_attempts: u32 },

    ///
    /// The failure threshold was reached and the account is locked until the time given.
    ///
    AccountLockedOut { failed_attempts: u32, locked_until: DateTime<Utc> },

    ///
    /// A lock that had already run out was cleared on access.
    ///
    LockExpired,

    PasswordChanged { requested_by: String },

    ///
    /// A Parent set a new password, which also unlocks the account.
    ///
    PasswordReset { requested_by: String },

    AccountUnlocked { requested_by: String },

    ///
    /// The stored hash was upgraded to the configured algorithm after a successful login.
    ///
    PasswordRehashed { from: Algorithm, to: Algorithm },
}

impl AuditEvent {
    pub fn description(&self) -> String {
        match self {
            AuditEvent::AccountProvisioned { role }  => format!("{} account provisioned", role),
            AuditEvent::LoginSucceeded               => "login succeeded".to_string(),
            AuditEvent::LoginFailed { failed_attempts } => format!("login failed (attempt {})", failed_attempts),
            AuditEvent::AccountLockedOut { failed_attempts, locked_until } =>
                format!("account locked after {} failed attempts until {}", failed_attempts, locked_until.to_rfc3339()),
            AuditEvent::LockExpired                  => "expired lock cleared".to_string(),
            AuditEvent::PasswordChanged { requested_by } => format!("password changed by {}", requested_by),
            AuditEvent::PasswordReset { requested_by }   => format!("password reset by {}", requested_by),
            AuditEvent::AccountUnlocked { requested_by } => format!("account unlocked by {}", requested_by),
            AuditEvent::PasswordRehashed { from, to }    => format!("password hash upgraded from {} to {}", from, to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_serialise_with_a_tag() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(&AuditEvent::PasswordReset { requested_by: "mum".to_string() })?;
        assert_eq!(json["event"], "PasswordReset");
        assert_eq!(json["requested_by"], "mum");

        let json = serde_json::to_value(&AuditEvent::LoginSucceeded)?;
        assert_eq!(json["event"], "LoginSucceeded");
        Ok(())
    }

    #[test]
    fn test_descriptions_name_the_requester() {
        let event = AuditEvent::AccountUnlocked { requested_by: "dad".to_string() };
        assert_eq!(event.description(), "account unlocked by dad");
    }
}
