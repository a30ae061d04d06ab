use serde::{Deserialize, Serialize};

use crate::links::render_markdown;
use crate::text::permalink;

/// A user-authored status update, as handed over by the web application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub uid: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Markdown body.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub published_tweet_uid: Option<String>,
}

impl Posting {
    pub fn new(uid: impl Into<String>, title: Option<String>, text: impl Into<String>) -> Self {
        let uid = uid.into();
        let permalink = permalink(&uid, title.as_deref());
        Self {
            uid,
            title,
            text: text.into(),
            permalink,
            published_tweet_uid: None,
        }
    }

    /// Fill in a missing permalink from uid and title.
    pub fn with_permalink(mut self) -> Self {
        if self.permalink.is_none() {
            self.permalink = permalink(&self.uid, self.title.as_deref());
        }
        self
    }

    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn html_text(&self) -> String {
        render_markdown(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub user_name: String,
    #[serde(default)]
    pub twitter_handle: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_posting_derives_permalink() {
        let p = Posting::new("aB87", Some("Hello World".into()), "**hi**");
        assert_eq!(p.permalink.as_deref(), Some("aB87-hello-world"));
        assert!(p.html_text().contains("<strong>hi</strong>"));
    }

    #[test]
    fn deserialized_posting_gets_permalink_on_request() {
        let p: Posting =
            serde_json::from_str(r#"{"uid":"u1","title":"Ecto Tips","text":"body"}"#).unwrap();
        assert_eq!(p.permalink, None);
        let p = p.with_permalink();
        assert_eq!(p.permalink.as_deref(), Some("u1-ecto-tips"));
    }

    #[test]
    fn untitled_posting_has_no_permalink() {
        let p = Posting::new("u2", None, "");
        assert_eq!(p.permalink, None);
        assert_eq!(p.title_or_empty(), "");
    }
}
