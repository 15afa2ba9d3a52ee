//! Business logic and repository trait definitions for easyshare.
//!
//! This crate defines the "ports" (repository traits and the chat platform)
//! that the infrastructure layer implements. It depends only on
//! `easyshare-types` -- never on `easyshare-infra` or any database/IO crate.

pub mod auth;
pub mod command;
pub mod platform;
pub mod repository;
pub mod service;

#[cfg(test)]
mod testing;
