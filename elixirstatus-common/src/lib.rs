//! Common types and utilities shared across ElixirStatus crates.
//!
//! This crate defines the deployment [`Environment`], observability helpers, and the
//! shared error type used throughout the workspace. It stays dependency-light so every
//! crate can depend on it.
//!
//! # Overview
//!
//! - [`Environment`]: Which deployment we run in; gates remote side effects
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`StatusError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use elixirstatus_common::Environment;
//!
//! let env: Environment = "prod".parse().unwrap();
//! assert!(env.is_production());
//! assert!(!Environment::Dev.is_production());
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod observability;

/// Deployment environment the application runs in.
///
/// Only [`Environment::Prod`] talks to third-party APIs; every other environment
/// replaces remote posting with a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Test,
    Prod,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Prod)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Test => "test",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Prod),
            other => Err(StatusError::Config(format!("unknown environment: {other}"))),
        }
    }
}

/// Error types used across the ElixirStatus workspace.
#[derive(thiserror::Error, Debug)]
pub enum StatusError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An outbound HTTP call failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The database rejected or failed a query.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A social network call returned something unusable.
    #[error("Social API error: {0}")]
    Social(String),

    /// A referenced record could not be located.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Convenient alias for results that use [`StatusError`].
pub type Result<T> = std::result::Result<T, StatusError>;
