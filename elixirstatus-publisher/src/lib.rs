//! The ElixirStatus publisher: text utilities, link shortening, and the reactions to
//! posting lifecycle events.
pub mod links;
pub mod posting;
pub mod publisher;
pub mod shortener;
pub mod store;
pub mod text;
pub mod tweet;
pub mod url;

pub use posting::{Author, Posting};
pub use publisher::Publisher;
pub use shortener::LinkShortener;
pub use store::{PostingRepo, ShortLinkRepo, SqliteStore};
pub use text::{permalink, truncate};
pub use tweet::{TweetOptions, compose_tweet};
pub use url::UrlBuilder;
