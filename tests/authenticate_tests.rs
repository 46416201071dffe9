mod common;
use chrono::Duration;
use more_asserts::assert_le;
use family_auth::model::events::AuditEvent;
use family_auth::utils::errors::{ErrorCode, Recovery};
use crate::common::{at, Family, SARAH_PASSWORD, START};


#[tokio::test]
async fn test_the_correct_password_logs_in() {
    let family = Family::new().await;

    let account = family.store.authenticate("sarah", SARAH_PASSWORD).await.unwrap();
    assert_eq!(account.id, family.sarah.id);
    assert_eq!(account.failed_login_attempts, 0);
    assert_eq!(account.last_login_time, Some(at(START)));

    assert_eq!(family.store.last_login("sarah"), Some(at(START)));
    assert_eq!(family.audit.events(), vec!(AuditEvent::LoginSucceeded));
}


#[tokio::test]
async fn test_usernames_are_case_insensitive() {
    let family = Family::new().await;

    let account = family.store.authenticate("  SARAH ", SARAH_PASSWORD).await.unwrap();
    assert_eq!(account.id, family.sarah.id);

    let account = family.store.authenticate("mum", common::MUM_PASSWORD).await.unwrap();
    assert_eq!(account.id, family.mum.id);
}


#[tokio::test]
async fn test_the_sarah_lockout_scenario() {
    let family = Family::new().await;

    let err = family.fail_login("sarah", "wrong").await;
    assert_eq!(err.error_code(), ErrorCode::InvalidCredentials);
    assert_eq!(err.failed_attempts(), Some(1));
    assert_eq!(family.account("sarah").account_locked_until, None);

    let err = family.fail_login("sarah", "wrong").await;
    assert_eq!(err.error_code(), ErrorCode::InvalidCredentials);
    assert_eq!(err.failed_attempts(), Some(2));
    assert_eq!(family.account("sarah").account_locked_until, None);

    // The third failure reaches the threshold and sets the lock.
    let err = family.fail_login("sarah", "wrong").await;
    assert_eq!(err.error_code(), ErrorCode::AccountLocked);
    assert_eq!(err.retry_after(), Some(Duration::minutes(15)));

    let sarah = family.account("sarah");
    assert_eq!(sarah.failed_login_attempts, 3);
    assert_eq!(sarah.account_locked_until, Some(at("2021-08-23T09:45:00Z")));

    // Now even her real password is refused.
    let err = family.fail_login("sarah", SARAH_PASSWORD).await;
    assert_eq!(err.error_code(), ErrorCode::AccountLocked);
    assert_eq!(err.error_code().recovery(), Recovery::TimeBound);
    assert!(family.store.is_account_locked("sarah"));
}


#[tokio::test]
async fn test_attempts_against_a_locked_account_dont_extend_the_lock() {
    let family = Family::new().await;
    family.lock_out("sarah").await;

    family.store.set_now(Some(at("2021-08-23T09:40:00Z")));
    let err = family.fail_login("sarah", "wrong").await;
    assert_eq!(err.error_code(), ErrorCode::AccountLocked);
    assert_eq!(err.retry_after(), Some(Duration::minutes(5)));
    assert!(err.message().contains("5 more minute"));

    let sarah = family.account("sarah");
    assert_eq!(sarah.failed_login_attempts, 3);
    assert_eq!(sarah.account_locked_until, Some(at("2021-08-23T09:45:00Z")));
}


#[tokio::test]
async fn test_an_expired_lock_is_cleared_on_login() {
    let family = Family::new().await;
    family.lock_out("sarah").await;

    // Still locked on the dot.
    family.store.set_now(Some(at("2021-08-23T09:44:59Z")));
    assert!(family.store.is_account_locked("sarah"));

    family.store.set_now(Some(at("2021-08-23T09:45:01Z")));
    family.audit.clear();

    let account = family.store.authenticate("sarah", SARAH_PASSWORD).await.unwrap();
    assert_eq!(account.failed_login_attempts, 0);
    assert_eq!(account.account_locked_until, None);
    assert_eq!(family.account("sarah").failed_login_attempts, 0);
    assert_eq!(family.audit.events(), vec!(AuditEvent::LockExpired, AuditEvent::LoginSucceeded));
}


#[tokio::test]
async fn test_a_wrong_password_after_expiry_starts_a_fresh_count() {
    let family = Family::new().await;
    family.lock_out("sarah").await;

    family.store.set_now(Some(at("2021-08-23T10:00:00Z")));

    let err = family.fail_login("sarah", "wrong").await;
    assert_eq!(err.error_code(), ErrorCode::InvalidCredentials);
    assert_eq!(err.failed_attempts(), Some(1));

    let sarah = family.account("sarah");
    assert_eq!(sarah.failed_login_attempts, 1);
    assert_eq!(sarah.account_locked_until, None);
}


#[tokio::test]
async fn test_is_account_locked_is_a_pure_read() {
    let family = Family::new().await;
    family.lock_out("sarah").await;
    let saves = family.repository.save_count();

    family.store.set_now(Some(at("2021-08-23T09:45:01Z")));
    assert!(!family.store.is_account_locked("sarah"));

    // The expired lock is still recorded until something clears it.
    assert_eq!(family.account("sarah").failed_login_attempts, 3);
    assert_eq!(family.repository.save_count(), saves);

    assert!(family.store.clear_expired_lock("sarah").await.unwrap());
    assert!(!family.store.clear_expired_lock("sarah").await.unwrap());

    let sarah = family.account("sarah");
    assert_eq!(sarah.failed_login_attempts, 0);
    assert_eq!(sarah.account_locked_until, None);
    assert_eq!(family.repository.save_count(), saves + 1);
}


#[tokio::test]
async fn test_clear_expired_lock_leaves_an_active_lock() {
    let family = Family::new().await;
    family.lock_out("sarah").await;

    assert!(!family.store.clear_expired_lock("sarah").await.unwrap());
    assert!(family.store.is_account_locked("sarah"));
}


#[tokio::test]
async fn test_unknown_usernames_look_like_wrong_passwords() {
    let family = Family::new().await;

    let unknown = family.fail_login("nobody", "wrong").await;
    let wrong = family.fail_login("sarah", "wrong").await;

    assert_eq!(unknown.error_code(), ErrorCode::UnknownAccount);
    assert_eq!(unknown.public_code(), ErrorCode::InvalidCredentials);
    assert_eq!(unknown.public_code(), wrong.public_code());
    assert_eq!(unknown.message(), wrong.message());
    assert_eq!(unknown.error_code().recovery(), Recovery::ClientCorrectable);

    assert!(!family.store.is_account_locked("nobody"));
}


#[tokio::test]
async fn test_a_successful_login_resets_the_failure_count() {
    let family = Family::new().await;

    family.fail_login("sarah", "wrong").await;
    family.fail_login("sarah", "wrong").await;
    assert_eq!(family.account("sarah").failed_login_attempts, 2);

    family.store.authenticate("sarah", SARAH_PASSWORD).await.unwrap();
    assert_eq!(family.account("sarah").failed_login_attempts, 0);

    // Two more failures are not enough to lock.
    family.fail_login("sarah", "wrong").await;
    let err = family.fail_login("sarah", "wrong").await;
    assert_eq!(err.error_code(), ErrorCode::InvalidCredentials);
}


#[tokio::test]
async fn test_failures_are_audited() {
    let family = Family::new().await;
    family.lock_out("sarah").await;

    assert_eq!(family.audit.events(), vec!(
        AuditEvent::LoginFailed { failed_attempts: 1 },
        AuditEvent::LoginFailed { failed_attempts: 2 },
        AuditEvent::AccountLockedOut { failed_attempts: 3, locked_until: at("2021-08-23T09:45:00Z") }));

    assert!(family.audit.records().iter().all(|record| record.account_id == family.sarah.id));
}


#[tokio::test]
async fn test_lockouts_are_per_account() {
    let family = Family::new().await;
    family.lock_out("sarah").await;

    assert!(!family.store.is_account_locked("tom"));
    family.store.authenticate("tom", common::TOM_PASSWORD).await.unwrap();
}


#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_failures_are_not_lost() {
    let family = Family::new().await;

    let first = {
        let store = family.store.clone();
        tokio::spawn(async move { store.authenticate("sarah", "wrong-1").await })
    };
    let second = {
        let store = family.store.clone();
        tokio::spawn(async move { store.authenticate("sarah", "wrong-2").await })
    };

    assert!(first.await.unwrap().is_err());
    assert!(second.await.unwrap().is_err());

    assert_eq!(family.account("sarah").failed_login_attempts, 2);
    assert_eq!(family.repository.saved().iter().find(|a| a.id == family.sarah.id).unwrap().failed_login_attempts, 2);
}


#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_racing_failures_lock_exactly_once() {
    let family = Family::new().await;

    let attempts: Vec<_> = (0..10)
        .map(|n| {
            let store = family.store.clone();
            tokio::spawn(async move { store.authenticate("sarah", &format!("wrong-{}", n)).await })
        })
        .collect();

    for attempt in attempts {
        assert!(attempt.await.unwrap().is_err());
    }

    // Failures against the locked account aren't counted.
    let sarah = family.account("sarah");
    assert_eq!(sarah.failed_login_attempts, 3);
    assert!(sarah.account_locked_until.is_some());

    let lockouts = family.audit.events()
        .into_iter()
        .filter(|event| matches!(event, AuditEvent::AccountLockedOut { .. }))
        .count();
    assert_eq!(lockouts, 1);
}


#[tokio::test]
async fn test_repeat_logins_are_served_from_the_cache() {
    let family = Family::new().await;

    family.store.authenticate("sarah", SARAH_PASSWORD).await.unwrap();
    let saves = family.repository.save_count();

    // A cached login still records the login time and is persisted.
    family.store.set_now(Some(at("2021-08-23T09:31:00Z")));
    let account = family.store.authenticate("sarah", SARAH_PASSWORD).await.unwrap();
    assert_eq!(account.last_login_time, Some(at("2021-08-23T09:31:00Z")));
    assert_le!(saves + 1, family.repository.save_count());

    // The cache never lets a locked account in.
    family.lock_out("sarah").await;
    let err = family.fail_login("sarah", SARAH_PASSWORD).await;
    assert_eq!(err.error_code(), ErrorCode::AccountLocked);
}
