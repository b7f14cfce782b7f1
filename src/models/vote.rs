use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Documento da collection "votes", one per tag
///
/// `mac` is stored as last-writer metadata only; identity is `tag_id`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub tag_id: String,
    pub mac: String,
    pub is_positive: bool,
    pub timestamp: DateTime<Utc>,
}
