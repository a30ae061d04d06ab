//! Thin wrapper around the Twitter/X v2 write endpoints.
//!
//! Requests use a user-context OAuth 2.0 access token as bearer auth. Writes are not
//! idempotent on Twitter's side, so posting uses a retry budget of zero; lookups keep
//! the shared client's default.
use crate::twitter::types::{
    CreateTweetRequest, CreateTweetResponse, CreatedTweet, DirectMessageEvent,
    DirectMessageRequest, DirectMessageResponse, User, UserLookupResponse,
};
use elixirstatus_common::{Result, StatusError};
use elixirstatus_http::{Auth, HttpClient, HttpError, RequestOpts};

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    access_token: String,
}

impl std::fmt::Debug for TwitterApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterApi")
            .field("base", &self.http.base().as_str())
            .field("access_token", &"<redacted>")
            .finish()
    }
}

fn http_err(e: HttpError) -> StatusError {
    StatusError::Http(e.to_string())
}

impl TwitterApi {
    pub fn new(access_token: String) -> Result<Self> {
        Self::with_base(DEFAULT_API_BASE, access_token)
    }

    pub fn with_base(base: &str, access_token: String) -> Result<Self> {
        let http = HttpClient::new(base).map_err(http_err)?;
        Ok(Self { http, access_token })
    }

    fn opts(&self, retries: Option<usize>) -> RequestOpts<'_> {
        RequestOpts {
            auth: Some(Auth::Bearer(&self.access_token)),
            retries,
            ..Default::default()
        }
    }

    pub async fn create_tweet(&self, text: &str) -> Result<CreatedTweet> {
        let resp: CreateTweetResponse = self
            .http
            .post_json("2/tweets", &CreateTweetRequest { text }, self.opts(Some(0)))
            .await
            .map_err(http_err)?;
        tracing::info!(tweet_id=%resp.data.id, "twitter.tweet.created");
        Ok(resp.data)
    }

    pub async fn user_by_username(&self, username: &str) -> Result<User> {
        let handle = username.trim_start_matches('@');
        let resp: UserLookupResponse = self
            .http
            .get_json(&format!("2/users/by/username/{handle}"), self.opts(None))
            .await
            .map_err(http_err)?;

        match resp.data {
            Some(user) => Ok(user),
            None => {
                let why = resp
                    .errors
                    .as_deref()
                    .and_then(|errs| errs.first())
                    .map(|p| p.describe())
                    .unwrap_or_else(|| "no user data returned".to_string());
                Err(StatusError::NotFound(format!("twitter user @{handle}: {why}")))
            }
        }
    }

    pub async fn send_direct_message_to_id(
        &self,
        participant_id: &str,
        text: &str,
    ) -> Result<DirectMessageEvent> {
        let resp: DirectMessageResponse = self
            .http
            .post_json(
                &format!("2/dm_conversations/with/{participant_id}/messages"),
                &DirectMessageRequest { text },
                self.opts(Some(0)),
            )
            .await
            .map_err(http_err)?;
        tracing::info!(
            dm_event_id=%resp.data.dm_event_id,
            dm_conversation_id=%resp.data.dm_conversation_id,
            "twitter.dm.sent"
        );
        Ok(resp.data)
    }

    /// Resolve `username` to an account id, then message it.
    pub async fn send_direct_message(
        &self,
        username: &str,
        text: &str,
    ) -> Result<DirectMessageEvent> {
        let user = self.user_by_username(username).await?;
        self.send_direct_message_to_id(&user.id, text).await
    }
}
