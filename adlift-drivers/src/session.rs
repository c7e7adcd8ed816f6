use std::collections::HashMap;
use std::time::Duration;

use adlift_common::{Credentials, ListingPayload};
use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use webdriver::capabilities::Capabilities;

/// Connection settings for the remote WebDriver endpoint.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// e.g. `http://selenium-hub:4444/wd/hub` or `http://localhost:9515`.
    pub webdriver_url: String,
    pub headless: bool,
    /// `ip:port` or `user:pass@ip:port`.
    pub proxy: Option<String>,
    pub user_agent: Option<String>,
}

/// Result of one collaborator operation: a success flag plus a failure
/// reason when it did not succeed.
#[derive(Debug, Clone)]
pub struct PostOutcome {
    pub success: bool,
    pub reason: Option<String>,
}

impl PostOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            reason: None,
        }
    }

    fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
        }
    }
}

/// An explicitly scoped browser session against the marketplace.
///
/// Acquire with [`AvitoSession::connect`], release with
/// [`AvitoSession::close`]; the session is never torn down implicitly by
/// drop timing.
pub struct AvitoSession {
    client: Client,
}

impl AvitoSession {
    /// Open a WebDriver session with the given browser options.
    pub async fn connect(options: &BrowserOptions) -> Result<Self> {
        let mut args = Vec::new();
        if options.headless {
            args.push("--headless".to_string());
            args.push("--disable-gpu".to_string());
        }
        if let Some(proxy) = &options.proxy {
            args.push(format!("--proxy-server={proxy}"));
        }
        if let Some(user_agent) = &options.user_agent {
            args.push(format!("user-agent={user_agent}"));
        }

        let mut chrome_opts = HashMap::new();
        chrome_opts.insert("args".to_string(), json!(args));

        let mut caps = Capabilities::new();
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&options.webdriver_url)
            .await
            .with_context(|| format!("webdriver connect to {}", options.webdriver_url))?;

        tracing::info!(url = %options.webdriver_url, "avito.session.connected");
        Ok(Self { client })
    }

    /// Log into the marketplace account.
    pub async fn login(&self, credentials: &Credentials) -> PostOutcome {
        match self.try_login(credentials).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "avito.login.failed");
                PostOutcome::failed(format!("{err:#}"))
            }
        }
    }

    async fn try_login(&self, credentials: &Credentials) -> Result<PostOutcome> {
        self.client
            .goto("https://www.avito.ru/profile/login")
            .await?;

        let login_input = self
            .client
            .wait()
            .for_element(Locator::Css("input[name='login']"))
            .await
            .context("login form did not appear")?;
        login_input.send_keys(&credentials.login).await?;

        self.client
            .find(Locator::Css("input[name='password']"))
            .await?
            .send_keys(&credentials.password)
            .await?;

        self.client
            .find(Locator::Css("button[type='submit']"))
            .await?
            .click()
            .await?;

        // The site redirects to the profile page on success.
        tokio::time::sleep(Duration::from_secs(3)).await;
        let url = self.client.current_url().await?;
        if url.as_str().contains("profile") {
            tracing::info!("avito.login.ok");
            Ok(PostOutcome::ok())
        } else {
            tracing::warn!(url = %url, "avito.login.rejected");
            Ok(PostOutcome::failed("login was not accepted"))
        }
    }

    /// Fill and submit the listing form for one ad.
    pub async fn post_listing(&self, listing: &ListingPayload) -> PostOutcome {
        match self.try_post_listing(listing).await {
            Ok(()) => {
                tracing::info!(title = %listing.title, "avito.listing.posted");
                PostOutcome::ok()
            }
            Err(err) => {
                tracing::error!(
                    title = %listing.title,
                    error = %format!("{err:#}"),
                    "avito.listing.failed"
                );
                PostOutcome::failed(format!("{err:#}"))
            }
        }
    }

    async fn try_post_listing(&self, listing: &ListingPayload) -> Result<()> {
        self.client.goto("https://www.avito.ru/additem").await?;

        let title_input = self
            .client
            .wait()
            .for_element(Locator::Css("input[data-marker='title']"))
            .await
            .context("listing form did not appear")?;
        title_input.send_keys(&listing.title).await?;

        self.client
            .find(Locator::Css("textarea[data-marker='description']"))
            .await?
            .send_keys(&listing.description)
            .await?;

        self.client
            .find(Locator::Css("input[data-marker='price']"))
            .await?
            .send_keys(&listing.price.to_string())
            .await?;

        // TODO: category selection and image upload need per-category
        // selectors; extra_fields are not mapped to form controls yet.

        self.client
            .find(Locator::Css("button[data-marker='publish']"))
            .await?
            .click()
            .await?;

        Ok(())
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
