use std::sync::Arc;

use crate::{
    database::{RecordStore, StoreError, UserFilter, UserMutation},
    models::{AssignOutcome, Contact},
    utils::{KeyedLocks, ServiceResult},
};

/// Binds NFC tags to users; a tag has at most one owner
pub struct TagAssignmentRegistry {
    store: Arc<dyn RecordStore>,
    locks: KeyedLocks,
}

impl TagAssignmentRegistry {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// Binds `tag_id` to the user registered as `email`.
    ///
    /// The user only has to exist; confirmation is not required.
    pub async fn assign(&self, email: &str, tag_id: &str) -> ServiceResult<AssignOutcome> {
        let _guard = self.locks.lock(tag_id).await;

        let Some(user) = self
            .store
            .find_one_user(UserFilter::Email(email.to_string()))
            .await?
        else {
            return Ok(AssignOutcome::UnknownUser);
        };

        if user.holds_tag(tag_id) {
            return Ok(AssignOutcome::AlreadyAssigned);
        }

        if let Some(owner) = self
            .store
            .find_one_user(UserFilter::Tag(tag_id.to_string()))
            .await?
        {
            log::warn!("⛔ Tag {} already belongs to {}, refused for {}", tag_id, owner.email, email);
            return Ok(AssignOutcome::TagTaken);
        }

        let added = self
            .store
            .update_user(
                UserFilter::Email(email.to_string()),
                UserMutation::AddTag(tag_id.to_string()),
            )
            .await;

        match added {
            Ok(true) => {
                log::info!("🏷️  Tag {} assigned to {}", tag_id, email);
                Ok(AssignOutcome::Assigned)
            }
            Ok(false) => Ok(AssignOutcome::UnknownUser),
            // Another process bound the tag between our check and write
            Err(StoreError::Duplicate { detail, .. }) => {
                log::warn!("⛔ Tag {} taken concurrently: {}", tag_id, detail);
                Ok(AssignOutcome::TagTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Contact of the user currently holding `tag_id`
    pub async fn find_owner(&self, tag_id: &str) -> ServiceResult<Option<Contact>> {
        let owner = self
            .store
            .find_one_user(UserFilter::Tag(tag_id.to_string()))
            .await?;

        Ok(owner.map(|u| u.contact()))
    }
}
