//! # parley-core
//!
//! Core types, traits, settings, and error handling for the Parley bot.

pub mod config;
pub mod error;
pub mod message;
pub mod traits;
