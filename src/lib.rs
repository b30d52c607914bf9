//! Operator tools for the mystery gift server.
//!
//! `mg-probe` checks that the gift websocket answers a time query, and
//! `mg-refresh` moves every gift in `gifts.toml` onto a fresh validity window.

pub mod config;
pub mod error;
pub mod gifts;
pub mod logging;
pub mod probe;
pub mod refresh;
pub mod timestamp;

pub use error::{GiftError, Result};
