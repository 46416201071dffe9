#![allow(dead_code)]

use std::sync::Arc;
use chrono::{DateTime, Utc};
use family_auth::CredentialStore;
use family_auth::db::memory::MemoryRepository;
use family_auth::model::{account::{Account, Role}, algorithm::argon::ArgonPolicy, policy::CredentialPolicy};
use family_auth::utils::{audit::MemoryAuditSink, errors::{ErrorCode, CredentialError}};

pub const MUM_PASSWORD: &str = "mumsecret";
pub const SARAH_PASSWORD: &str = "kid123";
pub const TOM_PASSWORD: &str = "skateboard";

///
/// The moment every test starts at.
///
pub const START: &str = "2021-08-23T09:30:00Z";

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
}

///
/// The default policy but with Argon2 turned right down so the tests don't crawl.
///
pub fn light_policy() -> CredentialPolicy {
    CredentialPolicy {
        argon_policy: ArgonPolicy { memory_size_kb: 1024, iterations: 1, ..ArgonPolicy::default() },
        ..CredentialPolicy::default()
    }
}

///
/// A store holding a Parent (mum), a Child (sarah) and a Teen (tom), with the clock fixed at START.
///
pub struct Family {
    pub store: Arc<CredentialStore>,
    pub repository: Arc<MemoryRepository>,
    pub audit: Arc<MemoryAuditSink>,
    pub mum: Account,
    pub sarah: Account,
    pub tom: Account,
}

impl Family {
    pub async fn new() -> Self {
        Self::with_policy(light_policy()).await
    }

    pub async fn with_policy(policy: CredentialPolicy) -> Self {
        family_auth::init_tracing();

        let repository = Arc::new(MemoryRepository::default());
        let audit = Arc::new(MemoryAuditSink::default());

        let store = CredentialStore::open(repository.clone(), audit.clone(), policy)
            .await
            .expect("Unable to open the store");

        store.set_now(Some(at(START)));

        let mum = store.provision_account("Mum", MUM_PASSWORD, Role::Parent).await.unwrap();
        let sarah = store.provision_account("sarah", SARAH_PASSWORD, Role::Child).await.unwrap();
        let tom = store.provision_account("tom", TOM_PASSWORD, Role::Teen).await.unwrap();

        // Start each test with a clean activity log.
        audit.clear();

        Family { store: Arc::new(store), repository, audit, mum, sarah, tom }
    }

    ///
    /// The committed copy of the account.
    ///
    pub fn account(&self, username: &str) -> Account {
        self.store.account(username).expect("No such account")
    }

    ///
    /// Fail to log in, returning the error code.
    ///
    pub async fn fail_login(&self, username: &str, password: &str) -> CredentialError {
        self.store.authenticate(username, password)
            .await
            .expect_err("The login should have failed")
    }

    pub async fn lock_out(&self, username: &str) {
        for _ in 0..3 {
            self.fail_login(username, "wrong").await;
        }
        assert_eq!(self.fail_login(username, "wrong").await.error_code(), ErrorCode::AccountLocked);
    }
}
