//! Telegram Bot API transport.
//!
//! `api` wraps the raw HTTP calls and implements [`ChatPlatform`] for the
//! command layer, `poller` runs the `getUpdates` long-poll loop and feeds
//! each text message to the command dispatcher.
//!
//! [`ChatPlatform`]: easyshare_core::platform::ChatPlatform

pub mod api;
pub mod poller;
pub mod types;

pub use api::TelegramApi;
pub use poller::poll_loop;
