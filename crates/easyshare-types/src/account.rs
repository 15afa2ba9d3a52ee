use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::service::ServiceId;

uuid_id!(
    /// Unique identifier for an account, wrapping a UUID v7.
    AccountId
);

/// One set of credentials under a service, plus its checkout state.
///
/// The checkout state lives in three nullable columns:
/// - `grabbed_at`/`grabbed_by`: the most recent claim, if any
/// - `released_at`: set once that claim has been released
///
/// The account is available iff it was never claimed or the latest claim
/// has been released.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub service_id: ServiceId,
    pub username: String,
    pub password: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub grabbed_at: Option<DateTime<Utc>>,
    pub grabbed_by: Option<String>,
    pub released_at: Option<DateTime<Utc>>,
    pub last_modified_by: Option<String>,
    pub last_modified_at: Option<DateTime<Utc>>,
}

/// Derived view of an account's checkout columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimState {
    Available,
    Claimed {
        by: String,
        since: DateTime<Utc>,
    },
}

impl Account {
    pub fn is_available(&self) -> bool {
        self.grabbed_at.is_none() || self.released_at.is_some()
    }

    /// Current holder, if the account is claimed.
    pub fn holder(&self) -> Option<&str> {
        if self.is_available() {
            None
        } else {
            self.grabbed_by.as_deref()
        }
    }

    pub fn claim_state(&self) -> ClaimState {
        match (self.is_available(), self.grabbed_at, &self.grabbed_by) {
            (false, Some(since), Some(by)) => ClaimState::Claimed {
                by: by.clone(),
                since,
            },
            _ => ClaimState::Available,
        }
    }
}

/// Input for registering a new account under a service.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub created_by: String,
}

/// An account listed together with the name of the service it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub service_name: String,
    pub account: Account,
}
