//! Text command surface of the bot.
//!
//! - `parse` -- command names, arity table and argument extraction
//! - `reply` -- reply text for every outcome
//! - `dispatch` -- `CommandDispatcher` tying parsing, authorization,
//!   the registry and the checkout engine together

pub mod dispatch;
pub mod parse;
pub mod reply;

pub use dispatch::{BotProfile, CommandDispatcher, Invocation};
pub use parse::{Command, CommandKind, ParseError, parse_command};
