use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::ChatId;

uuid_id!(
    /// Unique identifier for a service, wrapping a UUID v7.
    ServiceId
);

/// A shareable resource (e.g. a streaming subscription) registered in a chat.
///
/// `name` is unique within `chat_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub chat_id: ChatId,
    pub name: String,
    pub url: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub last_modified_by: Option<String>,
    pub last_modified_at: Option<DateTime<Utc>>,
}

impl Service {
    /// Build a new, never-modified service.
    pub fn new(chat_id: ChatId, name: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            id: ServiceId::new(),
            chat_id,
            name: name.into(),
            url: None,
            created_by: created_by.into(),
            created_at: Utc::now(),
            last_modified_by: None,
            last_modified_at: None,
        }
    }
}
