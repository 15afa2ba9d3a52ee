use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::chat::ChatId;
use crate::service::ServiceId;

uuid_id!(
    /// Unique identifier for a usage record, wrapping a UUID v7.
    UsageId
);

/// Audit record of one claim-to-release period.
///
/// `account_id` becomes `None` once the account is deleted and `service_id`
/// once the service is; the snapshot fields keep the row readable afterwards.
/// Ranking follows `service_id`, so history of a deleted account still
/// counts for its service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub id: UsageId,
    pub account_id: Option<AccountId>,
    pub service_id: Option<ServiceId>,
    pub chat_id: ChatId,
    /// Service name at claim time.
    pub service_name: String,
    /// Account username at claim time.
    pub account_username: String,
    pub performed_by: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Usage {
    pub fn is_open(&self) -> bool {
        self.finished_at.is_none()
    }

    /// Length of the claim period. Open periods accrue up to `now`.
    pub fn duration_until(&self, now: DateTime<Utc>) -> chrono::Duration {
        let end = self.finished_at.unwrap_or(now);
        (end - self.started_at).max(chrono::Duration::zero())
    }
}
