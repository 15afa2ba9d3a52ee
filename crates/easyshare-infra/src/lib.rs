//! Infrastructure layer for easyshare.
//!
//! Contains implementations of the ports defined in `easyshare-core`:
//! SQLite storage for the registry and usage ledger, and the Telegram Bot API
//! transport. Also loads configuration from the data directory.

pub mod config;
pub mod sqlite;
pub mod telegram;
