//! Core of the Cortex Discord relay bot.
//!
//! This crate is framework-agnostic. Discord and the completion API live
//! behind ports (traits) implemented in adapter crates.

pub mod commands;
pub mod completion;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
