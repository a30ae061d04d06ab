//! Canonical URLs for postings and short links.
use elixirstatus_common::{Result, StatusError};
use url::Url;

use crate::posting::Posting;

#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: Url,
}

impl UrlBuilder {
    /// `base` is the public site root, e.g. `https://elixirstatus.com`.
    pub fn new(base: &str) -> Result<Self> {
        let mut base =
            Url::parse(base.trim()).map_err(|e| StatusError::InvalidUrl(format!("{base}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(StatusError::InvalidUrl(format!(
                "{base}: site URL must be http or https"
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Append `segments` below the base, percent-encoding each one.
    fn with_segments(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| StatusError::InvalidUrl(format!("{}: cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `{base}/p/{permalink}`, falling back to the uid for untitled postings.
    pub fn posting_url(&self, posting: &Posting) -> Result<Url> {
        let slug = posting.permalink.as_deref().unwrap_or(&posting.uid);
        self.with_segments(&["p", slug])
    }

    /// `{base}/={uid}`
    pub fn short_link_url(&self, uid: &str) -> Result<Url> {
        self.with_segments(&[&format!("={uid}")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_posting_and_short_urls() {
        let urls = UrlBuilder::new("https://elixirstatus.com").unwrap();
        let posting = Posting::new("aB87", Some("I really like this TiTlE".into()), "");
        assert_eq!(
            urls.posting_url(&posting).unwrap().as_str(),
            "https://elixirstatus.com/p/aB87-i-really-like-this-title"
        );
        assert_eq!(
            urls.short_link_url("x9Y8z7").unwrap().as_str(),
            "https://elixirstatus.com/=x9Y8z7"
        );
    }

    #[test]
    fn keeps_sub_path_of_base() {
        let urls = UrlBuilder::new("http://localhost:4000/status").unwrap();
        assert_eq!(
            urls.short_link_url("abc").unwrap().as_str(),
            "http://localhost:4000/status/=abc"
        );
    }

    #[test]
    fn untitled_posting_uses_uid() {
        let urls = UrlBuilder::new("https://elixirstatus.com/").unwrap();
        let posting = Posting::new("q1", None, "body");
        assert_eq!(
            urls.posting_url(&posting).unwrap().as_str(),
            "https://elixirstatus.com/p/q1"
        );
    }

    #[test]
    fn reserved_characters_stay_in_the_path() {
        let urls = UrlBuilder::new("https://elixirstatus.com").unwrap();
        let posting = Posting::new("a?b#c", None, "");
        let url = urls.posting_url(&posting).unwrap();
        assert_eq!(url.as_str(), "https://elixirstatus.com/p/a%3Fb%23c");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let short = urls.short_link_url("x/y").unwrap();
        assert_eq!(short.as_str(), "https://elixirstatus.com/=x%2Fy");
    }

    #[test]
    fn rejects_non_http_bases() {
        assert!(UrlBuilder::new("ftp://elixirstatus.com").is_err());
        assert!(UrlBuilder::new("not a url").is_err());
    }
}
