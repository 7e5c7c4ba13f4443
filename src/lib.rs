//! Bonding curve trading service for agent tokens quoted in PROMPT.
//!
//! `curve` holds the pure pricing math, `engine` settles trades against
//! versioned agent state, `handlers` exposes both over HTTP.

pub mod config;
pub mod curve;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod params;
