//! Environment-gated posting: production talks to Twitter, everything else only logs.
use std::sync::Arc;

use async_trait::async_trait;
use elixirstatus_common::{Environment, Result, StatusError};

use crate::twitter::TwitterApi;

/// Where the publisher sends promotions and admin notifications.
#[async_trait]
pub trait SocialChannel: Send + Sync {
    /// Send a private message to `recipient` (a handle, with or without `@`).
    async fn send_direct_message(&self, recipient: &str, text: &str) -> Result<()>;

    /// Publish a status update. Returns the remote id when a post was actually made.
    async fn post_status(&self, text: &str) -> Result<Option<String>>;

    fn name(&self) -> &'static str;
}

#[async_trait]
impl SocialChannel for TwitterApi {
    async fn send_direct_message(&self, recipient: &str, text: &str) -> Result<()> {
        TwitterApi::send_direct_message(self, recipient, text).await?;
        Ok(())
    }

    async fn post_status(&self, text: &str) -> Result<Option<String>> {
        let tweet = self.create_tweet(text).await?;
        Ok(Some(tweet.id))
    }

    fn name(&self) -> &'static str {
        "twitter"
    }
}

/// Stand-in used outside production: records intent in the log, never calls out.
#[derive(Debug, Clone, Copy)]
pub struct DryRunChannel {
    environment: Environment,
}

impl DryRunChannel {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }
}

#[async_trait]
impl SocialChannel for DryRunChannel {
    async fn send_direct_message(&self, recipient: &str, text: &str) -> Result<()> {
        tracing::debug!(
            env=%self.environment,
            recipient,
            text,
            "social.dry_run.direct_message"
        );
        Ok(())
    }

    async fn post_status(&self, text: &str) -> Result<Option<String>> {
        tracing::debug!(
            env=%self.environment,
            text,
            chars=text.chars().count(),
            "social.dry_run.post_status"
        );
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}

/// Pick the channel for `environment`. Production requires an access token.
pub fn channel_for(
    environment: Environment,
    api_base: &str,
    access_token: Option<&str>,
) -> Result<Arc<dyn SocialChannel>> {
    if !environment.is_production() {
        return Ok(Arc::new(DryRunChannel::new(environment)));
    }
    let token = access_token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            StatusError::Config("twitter.access_token is required in production".into())
        })?;
    if token.contains("${") {
        return Err(StatusError::Config(
            "twitter.access_token still contains an unexpanded ${VAR} placeholder".into(),
        ));
    }
    Ok(Arc::new(TwitterApi::with_base(api_base, token.to_string())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twitter::DEFAULT_API_BASE;

    #[tokio::test]
    async fn dry_run_posts_nothing() {
        let channel = DryRunChannel::new(Environment::Dev);
        assert_eq!(channel.post_status("hello").await.unwrap(), None);
        channel.send_direct_message("admin", "hi").await.unwrap();
    }

    #[test]
    fn non_production_gets_dry_run() {
        let channel = channel_for(Environment::Test, DEFAULT_API_BASE, None).unwrap();
        assert_eq!(channel.name(), "dry-run");
    }

    #[test]
    fn production_requires_token() {
        let err = channel_for(Environment::Prod, DEFAULT_API_BASE, Some("  "))
            .err()
            .expect("missing token must fail");
        assert!(matches!(err, StatusError::Config(_)));

        let channel = channel_for(Environment::Prod, DEFAULT_API_BASE, Some("tok")).unwrap();
        assert_eq!(channel.name(), "twitter");
    }

    #[test]
    fn production_rejects_placeholder_token() {
        let err = channel_for(
            Environment::Prod,
            DEFAULT_API_BASE,
            Some("${TWITTER_ACCESS_TOKEN}"),
        )
        .err()
        .expect("placeholder token must fail");
        assert!(matches!(err, StatusError::Config(ref m) if m.contains("placeholder")));
    }
}
