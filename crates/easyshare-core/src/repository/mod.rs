//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (easyshare-infra) implements. The core crate never depends on any
//! specific storage technology.
//!
//! Every lookup is scoped by chat: a service is addressed by
//! `(chat_id, name)` and an account by `(chat_id, service_name, username)`.

pub mod account;
pub mod service;
pub mod usage;
