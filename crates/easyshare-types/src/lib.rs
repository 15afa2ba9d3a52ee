//! Shared domain types for easyshare.
//!
//! The registry is three records deep: a [`service::Service`] owns
//! [`account::Account`]s, and every claim of an account leaves a
//! [`usage::Usage`] row behind. Everything is partitioned by the chat it was
//! created in.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

#[macro_use]
mod id;

pub mod account;
pub mod chat;
pub mod config;
pub mod error;
pub mod service;
pub mod usage;
