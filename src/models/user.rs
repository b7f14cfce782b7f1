use serde::{Deserialize, Serialize};

/// Documento da collection "users"
///
/// `email` is the identity key. `_id` and any other stored fields are
/// ignored on read.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub is_confirmed: bool,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub nfc_tags: Vec<String>,
}

impl User {
    /// Fresh, unconfirmed registration.
    pub fn new(email: impl Into<String>, name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            key: key.into(),
            is_confirmed: false,
            emails: Vec::new(),
            nfc_tags: Vec::new(),
        }
    }

    pub fn holds_tag(&self, tag_id: &str) -> bool {
        self.nfc_tags.iter().any(|t| t == tag_id)
    }

    pub fn contact(&self) -> Contact {
        Contact {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public projection of a user (contact list, tag owner lookup)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct Contact {
    pub name: String,
    pub email: String,
}
