//! Composition of the promotional tweet and the admin notification.
use crate::text::truncate;

pub const DEFAULT_MAX_TWEET_LENGTH: usize = 140;
pub const DEFAULT_HASHTAG: &str = "elixirlang";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetOptions {
    pub max_len: usize,
    /// Tag without the leading `#`.
    pub hashtag: Option<String>,
}

impl Default for TweetOptions {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_TWEET_LENGTH,
            hashtag: Some(DEFAULT_HASHTAG.to_string()),
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn normalize_handle(handle: Option<&str>) -> Option<&str> {
    handle
        .map(|h| h.trim().trim_start_matches('@'))
        .filter(|h| !h.is_empty())
}

/// `"{title} {short_link} via @{handle} #{hashtag}"`, squeezed into `opts.max_len`.
///
/// The title gives way first (word-aware truncation), then the author credit. The
/// hashtag is only appended when it still fits. A link longer than the limit on its own
/// is returned as is, since cutting a URL would break it.
///
/// ```
/// use elixirstatus_publisher::tweet::{compose_tweet, TweetOptions};
///
/// let text = compose_tweet(
///     "Plug 1.0 is out",
///     "https://elixirstatus.com/=a1B2c3",
///     Some("josevalim"),
///     &TweetOptions::default(),
/// );
/// assert_eq!(
///     text,
///     "Plug 1.0 is out https://elixirstatus.com/=a1B2c3 via @josevalim #elixirlang"
/// );
/// ```
pub fn compose_tweet(
    title: &str,
    short_link: &str,
    author_handle: Option<&str>,
    opts: &TweetOptions,
) -> String {
    let credit = normalize_handle(author_handle)
        .map(|h| format!(" via @{h}"))
        .unwrap_or_default();

    let mut tail = format!(" {short_link}{credit}");
    if char_len(&tail) > opts.max_len {
        tail = format!(" {short_link}");
    }
    if char_len(&tail) > opts.max_len {
        return short_link.to_string();
    }

    let title = truncate(title.trim(), opts.max_len - char_len(&tail));
    let mut text = if title.is_empty() {
        tail.trim_start().to_string()
    } else {
        format!("{title}{tail}")
    };

    if let Some(tag) = opts
        .hashtag
        .as_deref()
        .map(|t| t.trim().trim_start_matches('#'))
        .filter(|t| !t.is_empty())
    {
        let suffix = format!(" #{tag}");
        if char_len(&text) + char_len(&suffix) <= opts.max_len {
            text.push_str(&suffix);
        }
    }
    text
}

/// Direct message sent to the site admin when a posting goes live.
pub fn direct_message_text(title: &str, author_name: &str, short_link: &str) -> String {
    format!("New posting by {author_name}: {} {short_link}", title.trim())
}
