use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Publish ElixirStatus postings: short links, admin notification, and tweets.
#[derive(Debug, Parser)]
#[command(name = "elixirstatus")]
#[command(version)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(long, global = true, default_value = "elixirstatus.yaml", env = "ELIXIRSTATUS_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Store a new posting and announce it
    Create {
        /// Posting as JSON: {"uid", "title", "text"}
        #[arg(long)]
        file: PathBuf,

        /// Display name used in the admin notification [default: the handle, else "anonymous"]
        #[arg(long)]
        author_name: Option<String>,

        /// Author's Twitter handle, credited in the tweet
        #[arg(long)]
        twitter_handle: Option<String>,
    },

    /// Refresh short links of a stored posting
    Update {
        #[arg(long)]
        uid: String,
    },

    /// Print the permalink for a uid and title
    Permalink {
        #[arg(long)]
        uid: String,

        #[arg(long)]
        title: Option<String>,
    },

    /// Print TEXT truncated on a word boundary
    Truncate {
        #[arg(long)]
        max_len: usize,

        text: String,
    },

    /// Print the tweet a stored posting would be announced with
    Tweet {
        #[arg(long)]
        uid: String,

        #[arg(long)]
        twitter_handle: Option<String>,
    },

    /// Print the URL behind a short link uid
    Resolve { uid: String },
}
