//! # parley-channels
//!
//! Chat platform integrations for Parley.

pub mod discord;
