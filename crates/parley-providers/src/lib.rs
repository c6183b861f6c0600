//! # parley-providers
//!
//! Translation provider implementations for Parley.

pub mod google;
