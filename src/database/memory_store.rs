use async_trait::async_trait;
use tokio::sync::RwLock;

use super::record_store::{
    RecordStore, StoreError, StoreResult, UserFilter, UserMutation, USERS, VOTES,
};
use crate::models::{User, Vote};

/// In-process store for tests and `STORE_BACKEND=memory`.
///
/// Documents keep insertion order, so iteration order matches what a
/// fresh MongoDB collection returns.
#[derive(Default)]
pub struct InMemoryRecordStore {
    users: RwLock<Vec<User>>,
    votes: RwLock<Vec<Vote>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user document as-is, bypassing the registries.
    #[cfg(test)]
    pub async fn with_user(self, user: User) -> Self {
        self.users.write().await.push(user);
        self
    }

    #[cfg(test)]
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn find_one_user(&self, filter: UserFilter) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| filter.matches(u)).cloned())
    }

    async fn find_users(&self, filter: UserFilter) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| filter.matches(u)).cloned().collect())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate {
                collection: USERS,
                detail: format!("email {}", user.email),
            });
        }
        if let Some(tag_id) = user
            .nfc_tags
            .iter()
            .find(|tag_id| users.iter().any(|u| u.holds_tag(tag_id)))
        {
            return Err(StoreError::Duplicate {
                collection: USERS,
                detail: format!("nfcTags {}", tag_id),
            });
        }

        users.push(user.clone());
        Ok(())
    }

    async fn update_user(&self, filter: UserFilter, mutation: UserMutation) -> StoreResult<bool> {
        let mut users = self.users.write().await;

        let Some(index) = users.iter().position(|u| filter.matches(u)) else {
            return Ok(false);
        };

        match mutation {
            UserMutation::RotateKey(key) => users[index].key = key,
            UserMutation::Confirm => users[index].is_confirmed = true,
            UserMutation::AddTag(tag_id) => {
                if users[index].holds_tag(&tag_id) {
                    return Ok(true);
                }
                // Same rule as the unique multikey index on nfcTags
                if users.iter().any(|u| u.holds_tag(&tag_id)) {
                    return Err(StoreError::Duplicate {
                        collection: USERS,
                        detail: format!("nfcTags {}", tag_id),
                    });
                }
                users[index].nfc_tags.push(tag_id);
            }
        }

        Ok(true)
    }

    async fn find_vote(&self, tag_id: &str) -> StoreResult<Option<Vote>> {
        let votes = self.votes.read().await;
        Ok(votes.iter().find(|v| v.tag_id == tag_id).cloned())
    }

    async fn upsert_vote(&self, vote: &Vote) -> StoreResult<()> {
        let mut votes = self.votes.write().await;

        match votes.iter_mut().find(|v| v.tag_id == vote.tag_id) {
            Some(existing) => *existing = vote.clone(),
            None => votes.push(vote.clone()),
        }

        log::debug!("{}: upserted vote for tag {}", VOTES, vote.tag_id);
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str, tags: &[&str]) -> User {
        let mut user = User::new(email, "Jan Kowalski", "key");
        user.nfc_tags = tags.iter().map(|t| t.to_string()).collect();
        user
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email() {
        let store = InMemoryRecordStore::new();
        store.insert_user(&user("jan@kowalski.com", &[])).await.unwrap();

        let result = store.insert_user(&user("jan@kowalski.com", &[])).await;

        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_add_tag_enforces_single_owner() {
        let store = InMemoryRecordStore::new()
            .with_user(user("bob@example.com", &["tag_id"]))
            .await
            .with_user(user("jan@kowalski.com", &[]))
            .await;

        let result = store
            .update_user(
                UserFilter::Email("jan@kowalski.com".into()),
                UserMutation::AddTag("tag_id".into()),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
        let jan = store
            .find_one_user(UserFilter::Email("jan@kowalski.com".into()))
            .await
            .unwrap()
            .unwrap();
        assert!(jan.nfc_tags.is_empty());
    }

    #[tokio::test]
    async fn test_add_tag_is_a_set_insert() {
        let store = InMemoryRecordStore::new()
            .with_user(user("jan@kowalski.com", &["tag_id"]))
            .await;

        let matched = store
            .update_user(
                UserFilter::Email("jan@kowalski.com".into()),
                UserMutation::AddTag("tag_id".into()),
            )
            .await
            .unwrap();

        assert!(matched);
        let owner = store
            .find_one_user(UserFilter::Tag("tag_id".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(owner.nfc_tags, vec!["tag_id".to_string()]);
    }

    #[tokio::test]
    async fn test_update_reports_missing_document() {
        let store = InMemoryRecordStore::new();

        let matched = store
            .update_user(UserFilter::Email("ghost@example.com".into()), UserMutation::Confirm)
            .await
            .unwrap();

        assert!(!matched);
    }
}
