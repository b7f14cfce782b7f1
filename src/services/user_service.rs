use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::{
    database::{RecordStore, UserFilter, UserMutation},
    models::{ConfirmOutcome, RegisterOutcome, User},
    services::notification_service::{dispatch, NotificationKind, Notifier},
    utils::{generate_confirmation_key, KeyedLocks, ServiceResult},
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ConfirmRequest {
    pub email: String,
    pub key: String,
}

/// Registration and confirmation of users keyed by email
pub struct UserRegistry {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    locks: KeyedLocks,
}

impl UserRegistry {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            locks: KeyedLocks::new(),
        }
    }

    /// Registers `email`, or reissues its key while it is unconfirmed.
    ///
    /// A confirmed address is left untouched and gets a deny mail.
    pub async fn register(&self, email: &str, name: &str) -> ServiceResult<RegisterOutcome> {
        let _guard = self.locks.lock(email).await;

        let existing = self
            .store
            .find_one_user(UserFilter::Email(email.to_string()))
            .await?;

        match existing {
            None => {
                let user = User::new(email, name, generate_confirmation_key());
                self.store.insert_user(&user).await?;

                log::info!("✅ User registered: {}", email);
                self.send_welcome(&user.email, &user.name, &user.key).await;
                Ok(RegisterOutcome::Registered)
            }
            Some(user) if !user.is_confirmed => {
                let key = fresh_key(&user.key);
                self.store
                    .update_user(
                        UserFilter::Email(email.to_string()),
                        UserMutation::RotateKey(key.clone()),
                    )
                    .await?;

                log::info!("🔁 Confirmation key reissued for {}", email);
                self.send_welcome(&user.email, &user.name, &key).await;
                Ok(RegisterOutcome::Registered)
            }
            Some(user) => {
                log::info!("⚠️  Registration denied, {} is already confirmed", email);
                dispatch(
                    self.notifier.as_ref(),
                    &user.email,
                    NotificationKind::Deny,
                    json!({ "name": user.name, "email": user.email }),
                )
                .await;
                Ok(RegisterOutcome::AlreadyConfirmed)
            }
        }
    }

    /// Confirms `email` when `key` matches the last issued key.
    ///
    /// An already confirmed user gets the confirm-twice mail whatever key
    /// was supplied; the key only guards the unconfirmed state.
    pub async fn confirm(&self, email: &str, key: &str) -> ServiceResult<ConfirmOutcome> {
        let _guard = self.locks.lock(email).await;

        let Some(user) = self
            .store
            .find_one_user(UserFilter::Email(email.to_string()))
            .await?
        else {
            log::info!("🔍 Confirmation for unknown user {}", email);
            return Ok(ConfirmOutcome::UnknownUser);
        };

        if user.is_confirmed {
            dispatch(
                self.notifier.as_ref(),
                &user.email,
                NotificationKind::ConfirmTwice,
                json!({ "name": user.name, "email": user.email }),
            )
            .await;
            return Ok(ConfirmOutcome::AlreadyConfirmed);
        }

        if user.key != key {
            log::warn!("🔒 Confirmation key mismatch for {}", email);
            return Ok(ConfirmOutcome::KeyMismatch);
        }

        self.store
            .update_user(UserFilter::Email(email.to_string()), UserMutation::Confirm)
            .await?;

        log::info!("✅ User confirmed: {}", email);
        dispatch(
            self.notifier.as_ref(),
            &user.email,
            NotificationKind::ConfirmationInfo,
            json!({ "name": user.name, "email": user.email }),
        )
        .await;
        Ok(ConfirmOutcome::Confirmed)
    }

    async fn send_welcome(&self, email: &str, name: &str, key: &str) {
        dispatch(
            self.notifier.as_ref(),
            email,
            NotificationKind::Welcome,
            json!({ "name": name, "email": email, "key": key }),
        )
        .await;
    }
}

fn fresh_key(previous: &str) -> String {
    loop {
        let key = generate_confirmation_key();
        if key != previous {
            return key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryRecordStore;
    use crate::services::notification_service::RecordingNotifier;

    const EMAIL: &str = "jan@kowalski.com";
    const NAME: &str = "Jan Kowalski";
    const TEST_KEY: &str = "test-key";

    fn stored_user(confirmed: bool) -> User {
        let mut user = User::new(EMAIL, NAME, TEST_KEY);
        user.is_confirmed = confirmed;
        user
    }

    async fn registry_with(users: Vec<User>) -> (UserRegistry, Arc<InMemoryRecordStore>, RecordingNotifier) {
        let mut store = InMemoryRecordStore::new();
        for user in users {
            store = store.with_user(user).await;
        }
        let store = Arc::new(store);
        let notifier = RecordingNotifier::new();
        let registry = UserRegistry::new(store.clone(), Arc::new(notifier.clone()));
        (registry, store, notifier)
    }

    async fn user_in_db(store: &InMemoryRecordStore) -> User {
        store
            .find_one_user(UserFilter::Email(EMAIL.to_string()))
            .await
            .unwrap()
            .expect("user stored")
    }

    #[tokio::test]
    async fn test_register_creates_unconfirmed_user_and_sends_welcome() {
        let (registry, store, notifier) = registry_with(vec![]).await;

        let outcome = registry.register(EMAIL, NAME).await.unwrap();

        assert_eq!(outcome, RegisterOutcome::Registered);
        assert_eq!(store.user_count().await, 1);
        let user = user_in_db(&store).await;
        assert_eq!(user.name, NAME);
        assert!(!user.is_confirmed);
        assert!(user.emails.is_empty());
        assert!(!user.key.is_empty());

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, EMAIL);
        assert_eq!(sent[0].kind, NotificationKind::Welcome);
        assert_eq!(sent[0].context["key"], user.key.as_str());
    }

    #[tokio::test]
    async fn test_reregistering_unconfirmed_user_rotates_key() {
        let (registry, store, notifier) = registry_with(vec![stored_user(false)]).await;

        let outcome = registry.register(EMAIL, NAME).await.unwrap();

        assert_eq!(outcome, RegisterOutcome::Registered);
        assert_eq!(store.user_count().await, 1);
        let user = user_in_db(&store).await;
        assert_ne!(user.key, TEST_KEY);
        assert_eq!(user.name, NAME);
        assert_eq!(notifier.kinds_sent_to(EMAIL), vec![NotificationKind::Welcome]);
        assert_eq!(notifier.sent()[0].context["key"], user.key.as_str());
    }

    #[tokio::test]
    async fn test_each_retry_issues_a_new_key() {
        let (registry, store, _) = registry_with(vec![]).await;

        registry.register(EMAIL, NAME).await.unwrap();
        let first = user_in_db(&store).await.key;
        registry.register(EMAIL, NAME).await.unwrap();
        let second = user_in_db(&store).await.key;

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_registering_confirmed_user_is_denied_without_changes() {
        let (registry, store, notifier) = registry_with(vec![stored_user(true)]).await;

        let outcome = registry.register(EMAIL, NAME).await.unwrap();

        assert_eq!(outcome, RegisterOutcome::AlreadyConfirmed);
        assert_eq!(user_in_db(&store).await, stored_user(true));
        assert_eq!(notifier.kinds_sent_to(EMAIL), vec![NotificationKind::Deny]);
    }

    #[tokio::test]
    async fn test_confirm_unconfirmed_user() {
        let (registry, store, notifier) = registry_with(vec![stored_user(false)]).await;

        let outcome = registry.confirm(EMAIL, TEST_KEY).await.unwrap();

        assert_eq!(outcome, ConfirmOutcome::Confirmed);
        let user = user_in_db(&store).await;
        assert!(user.is_confirmed);
        assert_eq!(user.key, TEST_KEY);
        assert_eq!(notifier.kinds_sent_to(EMAIL), vec![NotificationKind::ConfirmationInfo]);
    }

    #[tokio::test]
    async fn test_confirm_twice_is_not_modified() {
        let (registry, store, notifier) = registry_with(vec![stored_user(false)]).await;

        registry.confirm(EMAIL, TEST_KEY).await.unwrap();
        let outcome = registry.confirm(EMAIL, TEST_KEY).await.unwrap();

        assert_eq!(outcome, ConfirmOutcome::AlreadyConfirmed);
        assert_eq!(user_in_db(&store).await, stored_user(true));
        assert_eq!(
            notifier.kinds_sent_to(EMAIL),
            vec![NotificationKind::ConfirmationInfo, NotificationKind::ConfirmTwice]
        );
    }

    #[tokio::test]
    async fn test_confirm_unknown_user() {
        let (registry, store, notifier) = registry_with(vec![]).await;

        let outcome = registry.confirm(EMAIL, TEST_KEY).await.unwrap();

        assert_eq!(outcome, ConfirmOutcome::UnknownUser);
        assert_eq!(store.user_count().await, 0);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_with_wrong_key_leaves_user_unconfirmed() {
        let (registry, store, notifier) = registry_with(vec![stored_user(false)]).await;

        let outcome = registry.confirm(EMAIL, "guessed-key").await.unwrap();

        assert_eq!(outcome, ConfirmOutcome::KeyMismatch);
        assert!(!user_in_db(&store).await.is_confirmed);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_confirmed_user_with_other_key_is_not_modified() {
        let (registry, store, notifier) = registry_with(vec![stored_user(true)]).await;

        let outcome = registry.confirm(EMAIL, "other-key").await.unwrap();

        assert_eq!(outcome, ConfirmOutcome::AlreadyConfirmed);
        assert_eq!(user_in_db(&store).await, stored_user(true));
        assert_eq!(notifier.kinds_sent_to(EMAIL), vec![NotificationKind::ConfirmTwice]);
    }

    #[tokio::test]
    async fn test_stale_key_is_rejected_after_reregistration() {
        let (registry, _, _) = registry_with(vec![stored_user(false)]).await;

        registry.register(EMAIL, NAME).await.unwrap();
        let outcome = registry.confirm(EMAIL, TEST_KEY).await.unwrap();

        assert_eq!(outcome, ConfirmOutcome::KeyMismatch);
    }

    #[tokio::test]
    async fn test_mail_failure_does_not_change_outcome() {
        let store = Arc::new(InMemoryRecordStore::new());
        let notifier = RecordingNotifier::failing();
        let registry = UserRegistry::new(store.clone(), Arc::new(notifier.clone()));

        let outcome = registry.register(EMAIL, NAME).await.unwrap();

        assert_eq!(outcome, RegisterOutcome::Registered);
        assert_eq!(store.user_count().await, 1);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_registrations_keep_one_document() {
        let (registry, store, notifier) = registry_with(vec![]).await;
        let registry = Arc::new(registry);

        let (a, b) = tokio::join!(registry.register(EMAIL, NAME), registry.register(EMAIL, NAME));

        assert_eq!(a.unwrap(), RegisterOutcome::Registered);
        assert_eq!(b.unwrap(), RegisterOutcome::Registered);
        assert_eq!(store.user_count().await, 1);
        // The last welcome mail carries the key that is actually stored
        let last = notifier.sent().pop().unwrap();
        assert_eq!(last.context["key"], user_in_db(&store).await.key.as_str());
    }
}
