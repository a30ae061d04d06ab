//! Reactions to posting lifecycle events: short links, admin notification, tweet.
use std::sync::Arc;

use elixirstatus_common::{Result, StatusError};
use elixirstatus_social::SocialChannel;
use tracing::{debug, info, warn};
use url::Url;

use crate::links::outbound_links;
use crate::posting::{Author, Posting};
use crate::shortener::LinkShortener;
use crate::store::PostingRepo;
use crate::tweet::{TweetOptions, compose_tweet, direct_message_text};
use crate::url::UrlBuilder;

#[derive(Clone)]
pub struct Publisher {
    urls: UrlBuilder,
    shortener: LinkShortener,
    channel: Arc<dyn SocialChannel>,
    postings: Arc<dyn PostingRepo>,
    tweet: TweetOptions,
    admin_recipient: Option<String>,
}

impl Publisher {
    pub fn new(
        urls: UrlBuilder,
        shortener: LinkShortener,
        channel: Arc<dyn SocialChannel>,
        postings: Arc<dyn PostingRepo>,
    ) -> Self {
        Self {
            urls,
            shortener,
            channel,
            postings,
            tweet: TweetOptions::default(),
            admin_recipient: None,
        }
    }

    pub fn with_tweet_options(mut self, tweet: TweetOptions) -> Self {
        self.tweet = tweet;
        self
    }

    /// Handle that receives a direct message for every new posting. Blank disables it.
    pub fn with_admin_recipient(mut self, recipient: Option<String>) -> Self {
        self.admin_recipient = recipient
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        self
    }

    pub fn channel_name(&self) -> &'static str {
        self.channel.name()
    }

    /// Shorten links, notify the admin, tweet, and record the tweet id.
    ///
    /// Returns the remote tweet id, or `None` when the channel did not post (dry run).
    /// The posting must already be stored, so the tweet id always has a row to land on.
    pub async fn after_create(&self, posting: &Posting, author: &Author) -> Result<Option<String>> {
        info!(
            posting_uid=%posting.uid,
            author=%author.user_name,
            channel=self.channel.name(),
            "publisher.after_create.start"
        );

        if self.postings.get_posting(&posting.uid).await?.is_none() {
            warn!(posting_uid=%posting.uid, "publisher.after_create.unknown_posting");
            return Err(StatusError::NotFound(format!("posting {}", posting.uid)));
        }

        self.create_all_short_links(posting).await?;
        let short_link = self.short_link(posting).await?;

        match self.admin_recipient.as_deref() {
            Some(recipient) => {
                let message =
                    direct_message_text(posting.title_or_empty(), &author.user_name, short_link.as_str());
                self.channel.send_direct_message(recipient, &message).await?;
                debug!(posting_uid=%posting.uid, recipient, "publisher.direct_message.sent");
            }
            None => debug!(posting_uid=%posting.uid, "publisher.direct_message.skipped"),
        }

        let text = self.tweet_text_with_link(posting, author, &short_link);
        let tweet_uid = self.channel.post_status(&text).await?;

        match tweet_uid.as_deref() {
            Some(id) => {
                self.postings.set_published_tweet_uid(&posting.uid, id).await?;
                info!(posting_uid=%posting.uid, tweet_uid=id, "publisher.after_create.done");
            }
            None => info!(posting_uid=%posting.uid, "publisher.after_create.not_posted"),
        }
        Ok(tweet_uid)
    }

    /// Refresh short links for an edited posting. Nothing is re-announced.
    pub async fn after_update(&self, posting: &Posting) -> Result<()> {
        info!(posting_uid=%posting.uid, "publisher.after_update.start");
        let created = self.create_all_short_links(posting).await?;
        info!(posting_uid=%posting.uid, links = created.len(), "publisher.after_update.done");
        Ok(())
    }

    /// Ensure every outbound link in the posting body has a short link uid.
    pub async fn create_all_short_links(&self, posting: &Posting) -> Result<Vec<String>> {
        let links = outbound_links(&posting.text);
        let mut uids = Vec::with_capacity(links.len());
        for link in &links {
            match self.shortener.to_uid(link).await {
                Ok(uid) => uids.push(uid),
                Err(e) => {
                    warn!(posting_uid=%posting.uid, url=%link, error=%e, "publisher.short_link.failed");
                    return Err(e);
                }
            }
        }
        debug!(posting_uid=%posting.uid, links = uids.len(), "publisher.short_links");
        Ok(uids)
    }

    /// Short URL pointing at the posting's canonical page.
    pub async fn short_link(&self, posting: &Posting) -> Result<Url> {
        let target = self.urls.posting_url(posting)?;
        let uid = self.shortener.to_uid(&target).await?;
        self.urls.short_link_url(&uid)
    }

    /// The tweet that [`after_create`](Self::after_create) would post.
    pub async fn tweet_text(&self, posting: &Posting, author: &Author) -> Result<String> {
        let short_link = self.short_link(posting).await?;
        Ok(self.tweet_text_with_link(posting, author, &short_link))
    }

    fn tweet_text_with_link(&self, posting: &Posting, author: &Author, short_link: &Url) -> String {
        compose_tweet(
            posting.title_or_empty(),
            short_link.as_str(),
            author.twitter_handle.as_deref(),
            &self.tweet,
        )
    }

    pub fn shortener(&self) -> &LinkShortener {
        &self.shortener
    }
}
