use async_trait::async_trait;
use thiserror::Error;

use crate::models::{User, Vote};

pub const USERS: &str = "users";
pub const VOTES: &str = "votes";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
    /// A unique index (email, nfcTags, tagId) rejected the write
    #[error("Duplicate key in {collection}: {detail}")]
    Duplicate { collection: &'static str, detail: String },
    #[error("Malformed document in {collection}: {detail}")]
    Serialization { collection: &'static str, detail: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Predicates over the `users` collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Email(String),
    /// User whose `nfcTags` contains the tag
    Tag(String),
    Confirmed,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        match self {
            UserFilter::Email(email) => &user.email == email,
            UserFilter::Tag(tag_id) => user.holds_tag(tag_id),
            UserFilter::Confirmed => user.is_confirmed,
        }
    }
}

/// Field updates applied atomically to a single user document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserMutation {
    RotateKey(String),
    Confirm,
    /// Set semantics: adding a tag the user already holds is a no-op
    AddTag(String),
}

/// Document store backing the registries.
///
/// Every write is atomic per document. Implementations must enforce the
/// uniqueness of `users.email`, of each `users.nfcTags` member across
/// users, and of `votes.tagId`, reporting violations as
/// [`StoreError::Duplicate`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_one_user(&self, filter: UserFilter) -> StoreResult<Option<User>>;

    /// Matching users in store iteration order
    async fn find_users(&self, filter: UserFilter) -> StoreResult<Vec<User>>;

    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    /// Returns whether a document matched the filter
    async fn update_user(&self, filter: UserFilter, mutation: UserMutation) -> StoreResult<bool>;

    async fn find_vote(&self, tag_id: &str) -> StoreResult<Option<Vote>>;

    /// Replaces the vote for `vote.tag_id`, inserting it when absent
    async fn upsert_vote(&self, vote: &Vote) -> StoreResult<()>;

    /// Connectivity check for the health endpoint
    async fn ping(&self) -> StoreResult<()>;
}
