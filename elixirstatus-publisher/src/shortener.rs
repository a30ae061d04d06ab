//! Find-or-create short links keyed by destination URL.
use std::sync::Arc;

use elixirstatus_common::{Result, StatusError};
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{debug, info, warn};
use url::Url;

use crate::store::ShortLinkRepo;

pub const UID_LENGTH: usize = 6;
const MAX_UID_ATTEMPTS: usize = 8;

#[derive(Clone)]
pub struct LinkShortener {
    repo: Arc<dyn ShortLinkRepo>,
}

fn generate_uid() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(UID_LENGTH)
        .map(char::from)
        .collect()
}

impl LinkShortener {
    pub fn new(repo: Arc<dyn ShortLinkRepo>) -> Self {
        Self { repo }
    }

    /// UID for `url`, creating one on first sight.
    pub async fn to_uid(&self, url: &Url) -> Result<String> {
        let url = url.as_str();
        if let Some(uid) = self.repo.uid_for_url(url).await? {
            debug!(uid, url, "shortener.existing");
            return Ok(uid);
        }

        for attempt in 1..=MAX_UID_ATTEMPTS {
            let uid = generate_uid();
            if self.repo.insert_short_link(&uid, url).await? {
                info!(uid, url, "shortener.created");
                return Ok(uid);
            }
            // Either the uid collided or someone else shortened the url meanwhile.
            if let Some(existing) = self.repo.uid_for_url(url).await? {
                return Ok(existing);
            }
            warn!(uid, url, attempt, "shortener.uid_collision");
        }

        Err(StatusError::Storage(format!(
            "no free short link uid for {url} after {MAX_UID_ATTEMPTS} attempts"
        )))
    }

    /// Destination behind `uid`, if any.
    pub async fn resolve(&self, uid: &str) -> Result<Option<Url>> {
        match self.repo.url_for_uid(uid).await? {
            Some(raw) => Url::parse(&raw)
                .map(Some)
                .map_err(|e| StatusError::InvalidUrl(format!("{raw}: {e}"))),
            None => Ok(None),
        }
    }
}
