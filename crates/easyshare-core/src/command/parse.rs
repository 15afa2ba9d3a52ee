//! Command parsing and arity validation.
//!
//! A command is the first whitespace-separated token of a message, starting
//! with `/` and optionally suffixed with `@BotUsername`. The remaining tokens
//! are its arguments; their count must match the command's arity exactly.

use std::fmt;

/// Every command the bot answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Start,
    Help,
    Services,
    Status,
    StatusMe,
    CreateService,
    UpdateService,
    DeleteService,
    Accounts,
    CreateAccount,
    UpdateAccount,
    DeleteAccount,
    Use,
    Release,
    Check,
    ReportBroken,
    Ranking,
}

impl CommandKind {
    /// All commands in the order they are listed by `/help`.
    pub const ALL: [CommandKind; 17] = [
        CommandKind::Start,
        CommandKind::Help,
        CommandKind::Services,
        CommandKind::Status,
        CommandKind::StatusMe,
        CommandKind::CreateService,
        CommandKind::UpdateService,
        CommandKind::DeleteService,
        CommandKind::Accounts,
        CommandKind::CreateAccount,
        CommandKind::UpdateAccount,
        CommandKind::DeleteAccount,
        CommandKind::Use,
        CommandKind::Release,
        CommandKind::Check,
        CommandKind::ReportBroken,
        CommandKind::Ranking,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Start => "start",
            CommandKind::Help => "help",
            CommandKind::Services => "services",
            CommandKind::Status => "status",
            CommandKind::StatusMe => "status_me",
            CommandKind::CreateService => "create_service",
            CommandKind::UpdateService => "update_service",
            CommandKind::DeleteService => "delete_service",
            CommandKind::Accounts => "accounts",
            CommandKind::CreateAccount => "create_account",
            CommandKind::UpdateAccount => "update_account",
            CommandKind::DeleteAccount => "delete_account",
            CommandKind::Use => "use",
            CommandKind::Release => "release",
            CommandKind::Check => "check",
            CommandKind::ReportBroken => "report_broken",
            CommandKind::Ranking => "ranking",
        }
    }

    /// Case-sensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Positional parameter names; the arity is their count.
    pub fn params(&self) -> &'static [&'static str] {
        match self {
            CommandKind::Start | CommandKind::Help | CommandKind::Services | CommandKind::StatusMe => {
                &[]
            }
            CommandKind::Status
            | CommandKind::CreateService
            | CommandKind::DeleteService
            | CommandKind::Accounts
            | CommandKind::Check
            | CommandKind::Ranking => &["service_name"],
            CommandKind::UpdateService => &["service_name", "new_service_name"],
            CommandKind::CreateAccount => &["service_name", "username", "password"],
            CommandKind::UpdateAccount => &["service_name", "username", "new_password"],
            CommandKind::DeleteAccount
            | CommandKind::Use
            | CommandKind::Release
            | CommandKind::ReportBroken => &["service_name", "username"],
        }
    }

    pub fn arity(&self) -> usize {
        self.params().len()
    }

    /// Whether only chat creators and administrators may run this command.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            CommandKind::CreateService
                | CommandKind::UpdateService
                | CommandKind::DeleteService
                | CommandKind::CreateAccount
                | CommandKind::UpdateAccount
                | CommandKind::DeleteAccount
        )
    }

    /// `/name <param> ...` as shown in help and usage replies.
    pub fn synopsis(&self) -> String {
        let mut out = format!("/{}", self.name());
        for param in self.params() {
            out.push_str(&format!(" <{param}>"));
        }
        out
    }

    /// The fixed reply for an arity mismatch.
    pub fn usage(&self) -> String {
        format!("Usage: {}", self.synopsis())
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed command with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Services,
    Status { service: String },
    StatusMe,
    CreateService { name: String },
    UpdateService { name: String, new_name: String },
    DeleteService { name: String },
    Accounts { service: String },
    CreateAccount { service: String, username: String, password: String },
    UpdateAccount { service: String, username: String, password: String },
    DeleteAccount { service: String, username: String },
    Use { service: String, username: String },
    Release { service: String, username: String },
    Check { service: String },
    ReportBroken { service: String, username: String },
    Ranking { service: String },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Start => CommandKind::Start,
            Command::Help => CommandKind::Help,
            Command::Services => CommandKind::Services,
            Command::Status { .. } => CommandKind::Status,
            Command::StatusMe => CommandKind::StatusMe,
            Command::CreateService { .. } => CommandKind::CreateService,
            Command::UpdateService { .. } => CommandKind::UpdateService,
            Command::DeleteService { .. } => CommandKind::DeleteService,
            Command::Accounts { .. } => CommandKind::Accounts,
            Command::CreateAccount { .. } => CommandKind::CreateAccount,
            Command::UpdateAccount { .. } => CommandKind::UpdateAccount,
            Command::DeleteAccount { .. } => CommandKind::DeleteAccount,
            Command::Use { .. } => CommandKind::Use,
            Command::Release { .. } => CommandKind::Release,
            Command::Check { .. } => CommandKind::Check,
            Command::ReportBroken { .. } => CommandKind::ReportBroken,
            Command::Ranking { .. } => CommandKind::Ranking,
        }
    }
}

/// Why a message did not produce a runnable command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Plain chat text, no leading `/`.
    NotACommand,
    /// `/cmd@OtherBot`: meant for a different bot in the same group.
    OtherBot(String),
    /// A `/command` this bot does not register.
    Unknown(String),
    /// A known command with the wrong number of arguments.
    Usage(CommandKind),
}

/// Parse a message into a command.
///
/// `bot_username` is this bot's handle; a command suffixed with any other
/// handle is rejected with [`ParseError::OtherBot`].
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Result<Command, ParseError> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next().ok_or(ParseError::NotACommand)?;
    let head = head.strip_prefix('/').ok_or(ParseError::NotACommand)?;

    let name = match head.split_once('@') {
        Some((name, target)) => {
            let ours = bot_username.is_some_and(|me| me.eq_ignore_ascii_case(target));
            if !ours {
                return Err(ParseError::OtherBot(target.to_string()));
            }
            name
        }
        None => head,
    };

    let kind = CommandKind::from_name(name).ok_or_else(|| ParseError::Unknown(name.to_string()))?;
    let args: Vec<String> = tokens.map(str::to_string).collect();
    if args.len() != kind.arity() {
        return Err(ParseError::Usage(kind));
    }

    let mut args = args.into_iter();
    let mut next = || args.next().unwrap_or_default();

    Ok(match kind {
        CommandKind::Start => Command::Start,
        CommandKind::Help => Command::Help,
        CommandKind::Services => Command::Services,
        CommandKind::StatusMe => Command::StatusMe,
        CommandKind::Status => Command::Status { service: next() },
        CommandKind::CreateService => Command::CreateService { name: next() },
        CommandKind::UpdateService => Command::UpdateService {
            name: next(),
            new_name: next(),
        },
        CommandKind::DeleteService => Command::DeleteService { name: next() },
        CommandKind::Accounts => Command::Accounts { service: next() },
        CommandKind::CreateAccount => Command::CreateAccount {
            service: next(),
            username: next(),
            password: next(),
        },
        CommandKind::UpdateAccount => Command::UpdateAccount {
            service: next(),
            username: next(),
            password: next(),
        },
        CommandKind::DeleteAccount => Command::DeleteAccount {
            service: next(),
            username: next(),
        },
        CommandKind::Use => Command::Use {
            service: next(),
            username: next(),
        },
        CommandKind::Release => Command::Release {
            service: next(),
            username: next(),
        },
        CommandKind::Check => Command::Check { service: next() },
        CommandKind::ReportBroken => Command::ReportBroken {
            service: next(),
            username: next(),
        },
        CommandKind::Ranking => Command::Ranking { service: next() },
    })
}
