use std::sync::Arc;

use anyhow::{Context, Result};
use elixirstatus_config::StatusConfig;
use elixirstatus_publisher::tweet::TweetOptions;
use elixirstatus_publisher::{LinkShortener, Publisher, SqliteStore, UrlBuilder};
use elixirstatus_social::channel_for;

/// Everything a command needs, built once from config.
pub struct App {
    pub store: Arc<SqliteStore>,
    pub publisher: Publisher,
}

pub async fn build_from_config(cfg: &StatusConfig) -> Result<App> {
    let store = Arc::new(
        SqliteStore::connect(&cfg.database_url)
            .await
            .with_context(|| format!("opening database {}", cfg.database_url))?,
    );

    let urls = UrlBuilder::new(&cfg.site.base_url).context("site.base_url")?;
    let channel = channel_for(
        cfg.environment,
        &cfg.twitter.api_base,
        cfg.twitter.access_token.as_deref(),
    )?;

    let tweet = TweetOptions {
        max_len: cfg.twitter.max_tweet_length,
        hashtag: cfg.twitter.hashtag().map(str::to_string),
    };

    let publisher = Publisher::new(urls, LinkShortener::new(store.clone()), channel, store.clone())
        .with_tweet_options(tweet)
        .with_admin_recipient(cfg.twitter.direct_message_recipient.clone());

    tracing::info!(
        env=%cfg.environment,
        channel=publisher.channel_name(),
        base_url=%cfg.site.base_url,
        "app.wired"
    );
    Ok(App { store, publisher })
}
