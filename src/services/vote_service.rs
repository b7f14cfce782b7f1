use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    database::RecordStore,
    models::{Vote, VoteOutcome},
    utils::{KeyedLocks, ServiceResult},
};

/// Vote as reported by a scanning device
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub mac: String,
    pub tag_id: String,
    pub is_positive: bool,
    #[schema(value_type = String, example = "2014-09-18T10:32:59+00:00")]
    pub timestamp: DateTime<Utc>,
}

/// Current sentiment per tag
pub struct VoteLedger {
    store: Arc<dyn RecordStore>,
    locks: KeyedLocks,
}

impl VoteLedger {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// Stores the vote unless the tag already carries the same sentiment.
    ///
    /// Timestamps do not order votes; a changed vote always overwrites.
    pub async fn record_vote(
        &self,
        tag_id: &str,
        mac: &str,
        is_positive: bool,
        timestamp: DateTime<Utc>,
    ) -> ServiceResult<VoteOutcome> {
        let _guard = self.locks.lock(tag_id).await;

        let previous = self.store.find_vote(tag_id).await?;
        let outcome = match &previous {
            None => VoteOutcome::Recorded,
            Some(vote) if vote.is_positive == is_positive => return Ok(VoteOutcome::Unchanged),
            Some(_) => VoteOutcome::Changed,
        };

        let vote = Vote {
            tag_id: tag_id.to_string(),
            mac: mac.to_string(),
            is_positive,
            timestamp,
        };
        self.store.upsert_vote(&vote).await?;

        log::info!("🗳️  Vote {:?} for tag {} (positive: {})", outcome, tag_id, is_positive);
        Ok(outcome)
    }
}
