use parking_lot::Mutex;
use chrono::{DateTime, Utc};
use crate::model::{account::Account, events::AuditEvent};
use super::errors::CredentialError;

///
/// Receives the activity log. Recording is fire-and-forget: the CredentialStore logs a failed
/// record and carries on with the operation.
///
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent, account: &Account) -> Result<(), CredentialError>;
}

///
/// Emits each audit event as a structured tracing event on the "audit" target.
///
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent, account: &Account) -> Result<(), CredentialError> {
        let details = serde_json::to_string(event)?;

        tracing::info!(
            target: "audit",
            account_id = %account.id,
            username = %account.username,
            details = %details,
            "{}", event.description());

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AuditRecord {
    pub event: AuditEvent,
    pub account_id: String,
    pub username: String,
    pub recorded_at: DateTime<Utc>,
}

///
/// Keeps every audit event in memory, in the order recorded.
///
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.records.lock().iter().map(|record| record.event.clone()).collect()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent, account: &Account) -> Result<(), CredentialError> {
        self.records.lock().push(AuditRecord {
            event: event.clone(),
            account_id: account.id.clone(),
            username: account.username.clone(),
            recorded_at: Utc::now(),
        });
        Ok(())
    }
}
