//! Reply text for every command outcome.
//!
//! Not-found replies deliberately cover both "absent" and "present but not
//! eligible" so unprivileged callers cannot probe accounts.

use chrono::{DateTime, Duration, Utc};
use easyshare_types::account::{Account, ClaimState, ServiceAccount};
use easyshare_types::chat::ChatMember;
use easyshare_types::service::Service;

use super::parse::CommandKind;
use crate::service::checkout::RankingEntry;

pub const PERMISSION_DENIED: &str = "This command is only available for admins.";
pub const INTERNAL_ERROR: &str = "An error occurred while processing your request.";
pub const SERVICE_NOT_FOUND: &str = "Service not found";
pub const ACCOUNT_NOT_FOUND: &str = "Account not found";

pub fn start() -> String {
    "Hi pal! I'm a bot, please talk to me!".to_string()
}

pub fn help(user_mention: &str, bot_name: &str) -> String {
    let mut msg = format!(
        "Hi {user_mention}.\n\nMy name is {bot_name} and I'm here to help you share accounts/services with friends and team.\n\nHere is the list of the available commands:\n-------------------------------------------------------"
    );
    for kind in CommandKind::ALL {
        if matches!(kind, CommandKind::Start | CommandKind::Help) {
            continue;
        }
        msg.push_str("\n  ");
        msg.push_str(&kind.synopsis());
        if kind.requires_admin() {
            msg.push_str("  (admins)");
        }
    }
    msg
}

pub fn services(services: &[Service]) -> String {
    if services.is_empty() {
        return "No services available.\nCreate a new service using:\n/create_service <service_name>"
            .to_string();
    }
    let mut msg = "These are the services available:".to_string();
    for service in services {
        msg.push_str("\n  *  ");
        msg.push_str(&service.name);
        if let Some(url) = &service.url {
            msg.push_str(&format!(" ({url})"));
        }
    }
    msg
}

pub fn status(service: &str, accounts: &[Account], now: DateTime<Utc>) -> String {
    if accounts.is_empty() {
        return format!("No accounts found for service {service}");
    }
    let mut msg = format!("This is the list of accounts for service {service}.");
    for account in accounts {
        let state = match account.claim_state() {
            ClaimState::Available => "available".to_string(),
            ClaimState::Claimed { by, since } => {
                format!("in use by @{by} for {}", format_duration(now - since))
            }
        };
        msg.push_str(&format!("\n  *  {}: {state}", account.username));
    }
    msg
}

pub fn status_me(claimed: &[ServiceAccount]) -> String {
    if claimed.is_empty() {
        return "You are not using any account currently.".to_string();
    }
    let mut msg = format!("You are currently using {} account(s):", claimed.len());
    for entry in claimed {
        msg.push_str(&format!(
            "\nService: {}; Username: {}; Password: {};",
            entry.service_name, entry.account.username, entry.account.password
        ));
    }
    msg
}

pub fn service_created(name: &str) -> String {
    format!(
        "Service {name} created successfully.\n\nNow add an account for this service using:\n/create_account {name} <username> <password>"
    )
}

pub fn service_exists(name: &str) -> String {
    format!("Service {name} already exists")
}

pub fn service_updated() -> String {
    "Service updated successfully".to_string()
}

pub fn service_deleted() -> String {
    "Service deleted successfully".to_string()
}

pub fn accounts(service: &str, accounts: &[Account]) -> String {
    if accounts.is_empty() {
        return format!("No accounts available for service {service}");
    }
    let mut msg = format!("These are the accounts for service {service}");
    for account in accounts {
        msg.push_str(&format!("\n *  {}\t{}", account.username, account.password));
    }
    msg
}

pub fn account_created(service: &str, username: &str) -> String {
    format!(
        "Account {username} successfully created for service {service}\n\nTo tell everyone that you are using this account, enter the following command:\n  /use {service} {username}\n\nWhen you are not using this account anymore, just enter the following command:\n  /release {service} {username}"
    )
}

pub fn account_exists(service: &str, username: &str) -> String {
    format!("Account {username} already exists for service {service}")
}

pub fn account_updated() -> String {
    "Account updated successfully".to_string()
}

pub fn service_or_account_not_found() -> String {
    "Service or Account not found".to_string()
}

pub fn account_deleted() -> String {
    "Account deleted successfully".to_string()
}

pub fn claimed(service: &str, username: &str) -> String {
    format!("You are now using service {service} with account {username}")
}

pub fn claim_failed() -> String {
    "Account not found or the account is already being used".to_string()
}

pub fn released() -> String {
    "Account released successfully".to_string()
}

pub fn release_failed() -> String {
    "Account not found or not being used by you".to_string()
}

pub fn check(service: &str, claimed: &[Account]) -> String {
    if claimed.is_empty() {
        return "Service not found or no accounts for this service or all accounts are available to be used"
            .to_string();
    }
    let mut msg =
        format!("Hi there. Are you still using the following account(s) for service {service}?\n");
    for account in claimed {
        let holder = account.holder().unwrap_or_default();
        msg.push_str(&format!("\nUsername: {}  (@{holder})", account.username));
    }
    msg
}

pub fn broken_report(
    service: &str,
    username: &str,
    reporter: &str,
    admins: &[ChatMember],
) -> String {
    let mentions: Vec<String> = admins
        .iter()
        .filter(|m| !m.user.is_bot)
        .map(|m| m.user.mention())
        .collect();
    let mut msg =
        format!("Account {username} of service {service} was reported as broken by {reporter}.");
    if mentions.is_empty() {
        msg.push_str("\nNo admins could be notified.");
    } else {
        msg.push_str(&format!("\nAdmins, please take a look: {}", mentions.join(" ")));
    }
    msg
}

pub fn ranking(service: &str, ranking: &[RankingEntry]) -> String {
    if ranking.is_empty() {
        return format!("No usage recorded for service {service}");
    }
    let mut msg = format!("Usage ranking for service {service}:");
    for (position, entry) in ranking.iter().enumerate() {
        msg.push_str(&format!(
            "\n  {}. @{}  {} ({} session(s))",
            position + 1,
            entry.performer,
            format_duration(entry.total),
            entry.sessions
        ));
    }
    msg
}

/// Render a duration as `"2h 5m"`, `"5m"` or `"40s"`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0);
    let (hours, minutes) = (secs / 3600, (secs % 3600) / 60);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{secs}s")
    }
}
