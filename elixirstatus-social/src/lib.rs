//! Social network clients used by the ElixirStatus publisher.
//!
//! [`channel::SocialChannel`] is the seam the publisher talks to; [`twitter`] holds the
//! only live implementation.
pub mod channel;
pub mod twitter;

pub use channel::{DryRunChannel, SocialChannel, channel_for};
