use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::Collection;

use super::record_store::{
    RecordStore, StoreError, StoreResult, UserFilter, UserMutation, USERS, VOTES,
};
use super::MongoDB;
use crate::models::{User, Vote};

const DUPLICATE_KEY: i32 = 11000;

/// [`RecordStore`] over the `users` and `votes` collections
#[derive(Clone)]
pub struct MongoRecordStore {
    db: MongoDB,
}

impl MongoRecordStore {
    pub fn new(db: MongoDB) -> Self {
        Self { db }
    }

    fn users(&self) -> Collection<User> {
        self.db.collection::<User>(USERS)
    }

    fn votes(&self) -> Collection<Vote> {
        self.db.collection::<Vote>(VOTES)
    }
}

fn user_filter(filter: &UserFilter) -> Document {
    match filter {
        UserFilter::Email(email) => doc! { "email": email },
        // Equality on an array field matches any member
        UserFilter::Tag(tag_id) => doc! { "nfcTags": tag_id },
        UserFilter::Confirmed => doc! { "isConfirmed": true },
    }
}

fn user_update(mutation: &UserMutation) -> Document {
    match mutation {
        UserMutation::RotateKey(key) => doc! { "$set": { "key": key } },
        UserMutation::Confirm => doc! { "$set": { "isConfirmed": true } },
        UserMutation::AddTag(tag_id) => doc! { "$addToSet": { "nfcTags": tag_id } },
    }
}

/// Splits driver errors into the store taxonomy
fn classify(collection: &'static str, err: mongodb::error::Error) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY =>
        {
            StoreError::Duplicate {
                collection,
                detail: write_error.message.clone(),
            }
        }
        ErrorKind::BsonDeserialization(e) => StoreError::Serialization {
            collection,
            detail: e.to_string(),
        },
        ErrorKind::BsonSerialization(e) => StoreError::Serialization {
            collection,
            detail: e.to_string(),
        },
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    async fn find_one_user(&self, filter: UserFilter) -> StoreResult<Option<User>> {
        self.users()
            .find_one(user_filter(&filter))
            .await
            .map_err(|e| classify(USERS, e))
    }

    async fn find_users(&self, filter: UserFilter) -> StoreResult<Vec<User>> {
        let cursor = self
            .users()
            .find(user_filter(&filter))
            .await
            .map_err(|e| classify(USERS, e))?;

        cursor.try_collect().await.map_err(|e| classify(USERS, e))
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.users()
            .insert_one(user)
            .await
            .map_err(|e| classify(USERS, e))?;
        Ok(())
    }

    async fn update_user(&self, filter: UserFilter, mutation: UserMutation) -> StoreResult<bool> {
        let result = self
            .users()
            .update_one(user_filter(&filter), user_update(&mutation))
            .await
            .map_err(|e| classify(USERS, e))?;

        Ok(result.matched_count > 0)
    }

    async fn find_vote(&self, tag_id: &str) -> StoreResult<Option<Vote>> {
        self.votes()
            .find_one(doc! { "tagId": tag_id })
            .await
            .map_err(|e| classify(VOTES, e))
    }

    async fn upsert_vote(&self, vote: &Vote) -> StoreResult<()> {
        self.votes()
            .replace_one(doc! { "tagId": &vote.tag_id }, vote)
            .upsert(true)
            .await
            .map_err(|e| classify(VOTES, e))?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.db.database().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    /// Fresh database per test so parallel tests do not share documents
    async fn connect(db_name: &str) -> MongoDB {
        dotenv::dotenv().ok();
        let server = std::env::var("TEST_MONGODB_SERVER")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db = MongoDB::new(&format!("{}/{}", server.trim_end_matches('/'), db_name))
            .await
            .expect("MongoDB must be running");
        db.drop_database().await.unwrap();
        // Dropping removes the indexes too
        MongoDB::new(&format!("{}/{}", server.trim_end_matches('/'), db_name))
            .await
            .expect("MongoDB must be running")
    }

    #[test]
    fn test_filters_use_stored_field_names() {
        assert_eq!(
            user_filter(&UserFilter::Tag("tag_id".into())),
            doc! { "nfcTags": "tag_id" }
        );
        assert_eq!(
            user_update(&UserMutation::AddTag("tag_id".into())),
            doc! { "$addToSet": { "nfcTags": "tag_id" } }
        );
        assert_eq!(user_filter(&UserFilter::Confirmed), doc! { "isConfirmed": true });
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_unique_tag_index_rejects_second_owner() {
        let db = connect("registration_test_tag_owner").await;
        let store = MongoRecordStore::new(db.clone());

        let mut bob = User::new("bob@example.com", "Bob", "k1");
        bob.nfc_tags.push("tag_id".to_string());
        store.insert_user(&bob).await.unwrap();
        store
            .insert_user(&User::new("jan@kowalski.com", "Jan Kowalski", "k2"))
            .await
            .unwrap();

        let result = store
            .update_user(
                UserFilter::Email("jan@kowalski.com".into()),
                UserMutation::AddTag("tag_id".into()),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
        db.drop_database().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_tagless_users_coexist_and_can_take_tags() {
        let db = connect("registration_test_tagless").await;
        let store = MongoRecordStore::new(db.clone());

        store
            .insert_user(&User::new("bob@example.com", "Bob", "k1"))
            .await
            .unwrap();
        store
            .insert_user(&User::new("jan@kowalski.com", "Jan Kowalski", "k2"))
            .await
            .unwrap();
        store
            .insert_user(&User::new("anna@nowak.pl", "Anna Nowak", "k3"))
            .await
            .unwrap();

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
        assert_eq!(owner.email, "jan@kowalski.com");
        assert_eq!(store.find_users(UserFilter::Tag("tag_id".into())).await.unwrap().len(), 1);
        db.drop_database().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_vote_upsert_replaces_existing_document() {
        let db = connect("registration_test_votes").await;
        let store = MongoRecordStore::new(db.clone());

        let mut vote = Vote {
            tag_id: "TAG_ID".to_string(),
            mac: "MAC".to_string(),
            is_positive: true,
            timestamp: Utc::now(),
        };
        store.upsert_vote(&vote).await.unwrap();
        vote.is_positive = false;
        store.upsert_vote(&vote).await.unwrap();

        let stored = store.find_vote("TAG_ID").await.unwrap().unwrap();
        assert!(!stored.is_positive);
        db.drop_database().await.unwrap();
    }
}
