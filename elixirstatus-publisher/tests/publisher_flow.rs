mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use elixirstatus_common::{Environment, Result, StatusError};
use elixirstatus_publisher::{
    Author, LinkShortener, Posting, PostingRepo, Publisher, SqliteStore, TweetOptions, UrlBuilder,
};
use elixirstatus_social::twitter::TwitterApi;
use elixirstatus_social::{SocialChannel, channel_for};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY: &str = "\
Plug 1.0 is out! Read [the announcement](https://elixir-lang.org/blog/plug) and
the [docs](https://hexdocs.pm/plug). Again: [docs](https://hexdocs.pm/plug).
";

#[derive(Default)]
struct RecordingChannel {
    tweet_id: Option<String>,
    fail_posts: bool,
    messages: Mutex<Vec<(String, String)>>,
    posts: Mutex<Vec<String>>,
}

#[async_trait]
impl SocialChannel for RecordingChannel {
    async fn send_direct_message(&self, recipient: &str, text: &str) -> Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((recipient.to_string(), text.to_string()));
        Ok(())
    }

    async fn post_status(&self, text: &str) -> Result<Option<String>> {
        if self.fail_posts {
            return Err(StatusError::Social("status is a duplicate".into()));
        }
        self.posts.lock().unwrap().push(text.to_string());
        Ok(self.tweet_id.clone())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

fn author() -> Author {
    Author {
        user_name: "jose".into(),
        twitter_handle: Some("josevalim".into()),
    }
}

async fn publisher_with(
    channel: Arc<dyn SocialChannel>,
) -> (Publisher, Arc<SqliteStore>, Posting) {
    common::init_test_tracing();
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    let posting = Posting::new("aB87", Some("Plug 1.0 released".into()), BODY);
    store.save_posting(&posting).await.unwrap();

    let publisher = Publisher::new(
        UrlBuilder::new("https://elixirstatus.com").unwrap(),
        LinkShortener::new(store.clone()),
        channel,
        store.clone(),
    )
    .with_admin_recipient(Some("elixirstatus".into()));
    (publisher, store, posting)
}

#[tokio::test]
async fn after_create_notifies_tweets_and_records_id() {
    let channel = Arc::new(RecordingChannel {
        tweet_id: Some("1445880548472328192".into()),
        ..Default::default()
    });
    let (publisher, store, posting) = publisher_with(channel.clone()).await;

    let tweet_id = publisher.after_create(&posting, &author()).await.unwrap();
    assert_eq!(tweet_id.as_deref(), Some("1445880548472328192"));

    let short_link = publisher.short_link(&posting).await.unwrap();

    let messages = channel.messages.lock().unwrap().clone();
    assert_eq!(
        messages,
        vec![(
            "elixirstatus".to_string(),
            format!("New posting by jose: Plug 1.0 released {short_link}")
        )]
    );

    let posts = channel.posts.lock().unwrap().clone();
    assert_eq!(
        posts,
        vec![format!("Plug 1.0 released {short_link} via @josevalim #elixirlang")]
    );

    let stored = store.get_posting("aB87").await.unwrap().unwrap();
    assert_eq!(stored.published_tweet_uid.as_deref(), Some("1445880548472328192"));

    // Two distinct body links plus the posting's own page.
    let urls: Vec<String> = store
        .list_short_links()
        .await
        .unwrap()
        .into_iter()
        .map(|(_, url)| url)
        .collect();
    assert_eq!(urls.len(), 3);
    assert!(urls.contains(&"https://elixir-lang.org/blog/plug".to_string()));
    assert!(urls.contains(&"https://hexdocs.pm/plug".to_string()));
    assert!(urls.contains(&"https://elixirstatus.com/p/aB87-plug-10-released".to_string()));
}

#[tokio::test]
async fn dry_run_posts_nothing_and_records_nothing() {
    let channel = channel_for(Environment::Dev, "https://api.twitter.com", None).unwrap();
    let (publisher, store, posting) = publisher_with(channel).await;

    let tweet_id = publisher.after_create(&posting, &author()).await.unwrap();
    assert_eq!(tweet_id, None);

    let stored = store.get_posting("aB87").await.unwrap().unwrap();
    assert_eq!(stored.published_tweet_uid, None);
    assert_eq!(store.list_short_links().await.unwrap().len(), 3);
}

#[tokio::test]
async fn posting_failure_propagates() {
    let channel = Arc::new(RecordingChannel {
        fail_posts: true,
        ..Default::default()
    });
    let (publisher, store, posting) = publisher_with(channel.clone()).await;

    let err = publisher.after_create(&posting, &author()).await.unwrap_err();
    assert!(matches!(err, StatusError::Social(_)));

    // The admin was told before the tweet failed, and nothing was recorded.
    assert_eq!(channel.messages.lock().unwrap().len(), 1);
    let stored = store.get_posting("aB87").await.unwrap().unwrap();
    assert_eq!(stored.published_tweet_uid, None);
}

#[tokio::test]
async fn unsaved_posting_is_rejected_before_any_remote_call() {
    let channel = Arc::new(RecordingChannel {
        tweet_id: Some("1445880548472328192".into()),
        ..Default::default()
    });
    let (publisher, store, _) = publisher_with(channel.clone()).await;
    let unsaved = Posting::new("zz99", Some("Hello".into()), BODY);

    let err = publisher.after_create(&unsaved, &author()).await.unwrap_err();
    assert!(matches!(err, StatusError::NotFound(ref m) if m.contains("zz99")));

    assert!(channel.messages.lock().unwrap().is_empty());
    assert!(channel.posts.lock().unwrap().is_empty());
    assert!(store.get_posting("zz99").await.unwrap().is_none());
}

#[tokio::test]
async fn after_update_only_refreshes_links() {
    let channel = Arc::new(RecordingChannel::default());
    let (publisher, store, posting) = publisher_with(channel.clone()).await;

    let edited = Posting {
        text: format!("{BODY}\nAlso see <https://hex.pm/packages/plug>."),
        ..posting
    };
    publisher.after_update(&edited).await.unwrap();
    publisher.after_update(&edited).await.unwrap();

    assert!(channel.messages.lock().unwrap().is_empty());
    assert!(channel.posts.lock().unwrap().is_empty());
    assert_eq!(store.list_short_links().await.unwrap().len(), 3);
}

#[tokio::test]
async fn long_titles_fit_the_configured_limit() {
    let channel = Arc::new(RecordingChannel::default());
    let (publisher, _store, _) = publisher_with(channel.clone()).await;
    let publisher = publisher.with_tweet_options(TweetOptions {
        max_len: 80,
        hashtag: Some("elixirlang".into()),
    });

    let posting = Posting::new(
        "zz11",
        Some("An unusually verbose title announcing a rather small patch release of a library".into()),
        "",
    );
    let text = publisher.tweet_text(&posting, &author()).await.unwrap();
    assert!(text.chars().count() <= 80, "{text}");
    assert!(text.contains("... https://elixirstatus.com/="));
}

#[tokio::test]
async fn twitter_end_to_end_against_mock_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/by/username/elixirstatus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "2244994945", "username": "elixirstatus", "name": "ElixirStatus"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/dm_conversations/with/2244994945/messages"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"dm_conversation_id": "1-2244994945", "dm_event_id": "1582838"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "1445880548472328192", "text": "ignored"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = TwitterApi::with_base(&server.uri(), "user-token".into()).unwrap();
    let (publisher, store, posting) = publisher_with(Arc::new(api)).await;

    let tweet_id = publisher.after_create(&posting, &author()).await.unwrap();
    assert_eq!(tweet_id.as_deref(), Some("1445880548472328192"));

    let requests = server.received_requests().await.unwrap();
    let tweet_request = requests
        .iter()
        .find(|r| r.url.path() == "/2/tweets")
        .unwrap();
    let body: Value = serde_json::from_slice(&tweet_request.body).unwrap();
    let text = body["text"].as_str().unwrap();
    assert!(text.starts_with("Plug 1.0 released https://elixirstatus.com/="));
    assert!(text.ends_with(" via @josevalim #elixirlang"));

    let stored = store.get_posting("aB87").await.unwrap().unwrap();
    assert_eq!(stored.published_tweet_uid.as_deref(), Some("1445880548472328192"));
}
