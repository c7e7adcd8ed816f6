//! Post one listing through a real browser session instead of the feed.
//!
//! Reads the listing payload from a JSON file, logs into the marketplace
//! with the configured credentials, fills the listing form, and reports the
//! outcome. The browser session is released on every exit path.

use std::fs::File;
use std::path::PathBuf;

use adlift_common::observability::{init_logging, LogConfig};
use adlift_common::{Credentials, ListingPayload};
use adlift_config::AdliftConfigLoader;
use adlift_drivers::{AvitoSession, BrowserOptions, PostOutcome};
use anyhow::{anyhow, bail, Result};
use clap::Parser;

#[derive(Parser)]
#[command(about = "Post a single listing through a browser session")]
struct Args {
    /// Path to a JSON file containing the listing payload.
    listing: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cfg = AdliftConfigLoader::new()
        .with_optional_file("adlift.yaml")
        .load()?;
    init_logging(LogConfig {
        emit_stderr: true,
        ..LogConfig::default()
    })?;

    let browser = cfg
        .browser
        .ok_or_else(|| anyhow!("config has no browser section"))?;
    let creds = cfg
        .credentials
        .ok_or_else(|| anyhow!("config has no credentials section"))?;
    let credentials = Credentials {
        login: creds.login,
        password: creds.password,
    };

    let listing: ListingPayload = serde_json::from_reader(File::open(&args.listing)?)?;

    let options = BrowserOptions {
        webdriver_url: browser.webdriver_url,
        headless: browser.headless,
        proxy: browser.proxy,
        user_agent: browser.user_agent,
    };

    let session = AvitoSession::connect(&options).await?;
    let outcome = run(&session, &credentials, &listing).await;
    // Release the session before inspecting the outcome.
    let closed = session.close().await;

    report(outcome)?;
    closed
}

async fn run(
    session: &AvitoSession,
    credentials: &Credentials,
    listing: &ListingPayload,
) -> PostOutcome {
    let login = session.login(credentials).await;
    if !login.success {
        return login;
    }
    session.post_listing(listing).await
}

fn report(outcome: PostOutcome) -> Result<()> {
    if outcome.success {
        println!("listing posted");
        Ok(())
    } else {
        bail!(
            "listing was not posted: {}",
            outcome.reason.unwrap_or_else(|| "unknown reason".into())
        )
    }
}
