use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use ferry::auth::TidalAuth;
use ferry::config::Config;
use ferry::lastfm::{LastfmClient, LibraryScraper};
use ferry::migrate::{migrate_artists, ItemOutcome};
use ferry::service::{MusicService, TidalClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::load()?;

    let creds = TidalAuth::load_credentials().context(
        "Could not load Tidal credentials. Log in with another Tidal OAuth tool and save \
         the tokens to the credentials path first.",
    )?;

    let mut tidal = TidalClient::new(creds, config.tidal.clone());
    tidal.refresh_token_if_needed().await?;
    tidal.save_credentials()?;

    if !tidal.is_authenticated() {
        anyhow::bail!("Tidal credentials are missing an access token");
    }
    println!("Logged in to Tidal");

    let username = prompt("Last.fm username: ")?;
    if username.is_empty() {
        anyhow::bail!("A Last.fm username is required");
    }

    let scraper = LibraryScraper::new(
        LastfmClient::new()?,
        config.lastfm.base_url.clone(),
        config.lastfm.page_cap,
    );

    println!("Collecting artists from {}'s library...", username);
    let artists = scraper.collect_artists(&username).await?;
    println!("Found {} artist entries", artists.len());

    let report = migrate_artists(&mut tidal, &artists, config.tidal.search_limit).await;

    for item in &report.items {
        match &item.outcome {
            ItemOutcome::Favorited { matched_name, .. } => {
                println!("  favorited '{}' (matched '{}')", item.name, matched_name);
            }
            ItemOutcome::NoMatch => {
                println!("  no match for '{}'", item.name);
            }
            ItemOutcome::Failed { reason } => {
                println!("  unable to favorite '{}': {}", item.name, reason);
            }
        }
    }

    println!(
        "Done: {} favorited, {} unmatched, {} failed",
        report.favorited_count(),
        report.unmatched_count(),
        report.failed_count()
    );

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
