use std::sync::Arc;

use crate::{
    database::{RecordStore, UserFilter},
    models::Contact,
    utils::ServiceResult,
};

/// Public contact list; unconfirmed users never appear
pub struct ContactDirectory {
    store: Arc<dyn RecordStore>,
}

impl ContactDirectory {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list_contacts(&self) -> ServiceResult<Vec<Contact>> {
        let users = self.store.find_users(UserFilter::Confirmed).await?;
        Ok(users.iter().map(|u| u.contact()).collect())
    }
}
