use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use elixirstatus_common::observability::init_logging;
use elixirstatus_config::{StatusConfig, StatusConfigLoader};
use elixirstatus_publisher::{Author, Posting, PostingRepo, permalink, truncate};

use cli::{Cli, Commands};
use wiring::{App, build_from_config};

mod cli;
mod wiring;

const APP_NAME: &str = "elixirstatus";

fn load_config(path: &Path) -> Result<StatusConfig> {
    // Env wins over the file.
    let cfg = StatusConfigLoader::new()
        .with_file(path)
        .load()
        .with_context(|| format!("loading {}", path.display()))?;
    let log_path = init_logging(cfg.logging.to_log_config(APP_NAME))?;
    tracing::debug!(log_path=%log_path.display(), env=%cfg.environment, "app.config_loaded");
    Ok(cfg)
}

async fn app(config: &Path) -> Result<App> {
    let cfg = load_config(config)?;
    build_from_config(&cfg).await
}

async fn stored_posting(app: &App, uid: &str) -> Result<Posting> {
    match app.store.get_posting(uid).await? {
        Some(posting) => Ok(posting),
        None => bail!("no posting with uid {uid}"),
    }
}

const ANONYMOUS_AUTHOR: &str = "anonymous";

fn author_for(author_name: Option<String>, twitter_handle: Option<String>) -> Author {
    let user_name = author_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .or_else(|| {
            twitter_handle
                .as_deref()
                .map(|h| h.trim().trim_start_matches('@').to_string())
                .filter(|h| !h.is_empty())
        })
        .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string());
    Author {
        user_name,
        twitter_handle,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Permalink { uid, title } => match permalink(&uid, title.as_deref()) {
            Some(link) => println!("{link}"),
            None => eprintln!("untitled postings have no permalink"),
        },

        Commands::Truncate { max_len, text } => println!("{}", truncate(&text, max_len)),

        Commands::Create {
            file,
            author_name,
            twitter_handle,
        } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let posting: Posting = serde_json::from_str(&raw)
                .with_context(|| format!("parsing posting {}", file.display()))?;
            let posting = posting.with_permalink();
            let author = author_for(author_name, twitter_handle);

            let app = app(&cli.config).await?;
            app.store.save_posting(&posting).await?;
            match app.publisher.after_create(&posting, &author).await? {
                Some(tweet_id) => println!("{} published as tweet {tweet_id}", posting.uid),
                None => println!("{} stored; nothing posted ({})", posting.uid, app.publisher.channel_name()),
            }
        }

        Commands::Update { uid } => {
            let app = app(&cli.config).await?;
            let posting = stored_posting(&app, &uid).await?;
            app.publisher.after_update(&posting).await?;
            println!("{uid} links refreshed");
        }

        Commands::Tweet {
            uid,
            twitter_handle,
        } => {
            let app = app(&cli.config).await?;
            let posting = stored_posting(&app, &uid).await?;
            let author = Author {
                user_name: String::new(),
                twitter_handle,
            };
            println!("{}", app.publisher.tweet_text(&posting, &author).await?);
        }

        Commands::Resolve { uid } => {
            let app = app(&cli.config).await?;
            match app.publisher.shortener().resolve(&uid).await? {
                Some(url) => println!("{url}"),
                None => bail!("unknown short link {uid}"),
            }
        }
    }

    Ok(())
}
