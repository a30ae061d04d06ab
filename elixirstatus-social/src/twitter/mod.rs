//! Twitter/X API v2 surface: posting statuses and sending direct messages.
pub mod client;
pub mod types;

pub use client::{DEFAULT_API_BASE, TwitterApi};
