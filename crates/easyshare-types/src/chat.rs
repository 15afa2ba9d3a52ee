//! Chat scope and participant types.
//!
//! A chat (group or private conversation) is the partition key for all
//! registry data. Participants are identified in the store by their
//! [`ChatUser::identity`] string.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Identifier of the chat a command was sent from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat participant as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUser {
    /// Platform user id (stable, used for membership lookups).
    pub id: i64,
    /// Public handle without the leading `@`, if the user has one.
    pub username: Option<String>,
    pub first_name: String,
    #[serde(default)]
    pub is_bot: bool,
}

impl ChatUser {
    /// The string recorded as `created_by`, `grabbed_by` and `performed_by`.
    ///
    /// Users without a public handle fall back to their numeric id so that
    /// two such users never collide.
    pub fn identity(&self) -> String {
        match &self.username {
            Some(username) if !username.is_empty() => username.clone(),
            _ => self.id.to_string(),
        }
    }

    /// How the user is addressed in replies.
    pub fn mention(&self) -> String {
        match &self.username {
            Some(username) if !username.is_empty() => format!("@{username}"),
            _ => self.first_name.clone(),
        }
    }
}

/// Membership role of a user inside a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MemberStatus {
    /// Whether this role may mutate services and accounts.
    pub fn is_privileged(&self) -> bool {
        matches!(self, MemberStatus::Creator | MemberStatus::Administrator)
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberStatus::Creator => write!(f, "creator"),
            MemberStatus::Administrator => write!(f, "administrator"),
            MemberStatus::Member => write!(f, "member"),
            MemberStatus::Restricted => write!(f, "restricted"),
            MemberStatus::Left => write!(f, "left"),
            MemberStatus::Banned => write!(f, "kicked"),
        }
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "creator" | "owner" => Ok(MemberStatus::Creator),
            "administrator" | "admin" => Ok(MemberStatus::Administrator),
            "member" => Ok(MemberStatus::Member),
            "restricted" => Ok(MemberStatus::Restricted),
            "left" => Ok(MemberStatus::Left),
            "kicked" | "banned" => Ok(MemberStatus::Banned),
            other => Err(format!("invalid member status: '{other}'")),
        }
    }
}

/// A user together with their role in a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMember {
    pub user: ChatUser,
    pub status: MemberStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, username: Option<&str>) -> ChatUser {
        ChatUser {
            id,
            username: username.map(str::to_string),
            first_name: "Alice".to_string(),
            is_bot: false,
        }
    }

    #[test]
    fn test_identity_prefers_username() {
        assert_eq!(user(7, Some("alice")).identity(), "alice");
    }

    #[test]
    fn test_identity_falls_back_to_id() {
        assert_eq!(user(7, None).identity(), "7");
        assert_eq!(user(7, Some("")).identity(), "7");
    }

    #[test]
    fn test_mention() {
        assert_eq!(user(7, Some("alice")).mention(), "@alice");
        assert_eq!(user(7, None).mention(), "Alice");
    }

    #[test]
    fn test_member_status_parses_platform_values() {
        assert_eq!("creator".parse::<MemberStatus>().unwrap(), MemberStatus::Creator);
        assert_eq!(
            "administrator".parse::<MemberStatus>().unwrap(),
            MemberStatus::Administrator
        );
        assert_eq!("admin".parse::<MemberStatus>().unwrap(), MemberStatus::Administrator);
        assert_eq!("kicked".parse::<MemberStatus>().unwrap(), MemberStatus::Banned);
        assert!("owner-ish".parse::<MemberStatus>().is_err());
    }

    #[test]
    fn test_only_creator_and_admin_are_privileged() {
        assert!(MemberStatus::Creator.is_privileged());
        assert!(MemberStatus::Administrator.is_privileged());
        for status in [
            MemberStatus::Member,
            MemberStatus::Restricted,
            MemberStatus::Left,
            MemberStatus::Banned,
        ] {
            assert!(!status.is_privileged());
        }
    }
}
