///! League page fetchers
///!
///! The league page fills its tables from script, so the default source is a
///! headless Chromium session polled until the fixtures table has enough rows.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use headless_chrome::browser::tab::RequestPausedDecision;
use headless_chrome::browser::transport::{SessionId, Transport};
use headless_chrome::protocol::cdp::Fetch::events::RequestPausedEvent;
use headless_chrome::protocol::cdp::Fetch::{FailRequest, RequestPattern, RequestStage};
use headless_chrome::protocol::cdp::Network::{ErrorReason, ResourceType};
use headless_chrome::{Browser, LaunchOptions};
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::{debug, info};

use super::parser::html_fixtures_ready;
use crate::config::SourceConfig;
use crate::error::{NessfixError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Not needed for the tables; skipping them speeds up the headless load
const BLOCKED_RESOURCES: [ResourceType; 3] = [ResourceType::Image, ResourceType::Media, ResourceType::Font];

fn blocked_request_patterns() -> Vec<RequestPattern> {
    BLOCKED_RESOURCES
        .into_iter()
        .map(|kind| RequestPattern {
            url_pattern: None,
            resource_Type: Some(kind),
            request_stage: Some(RequestStage::Request),
        })
        .collect()
}

/// Anything that can hand back the league page markup.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Where the markup comes from, for logs and errors
    fn url(&self) -> &str;

    async fn fetch_html(&self) -> Result<String>;
}

/// Pick the fetcher named by `[source] fetcher`.
pub fn page_source(config: &SourceConfig) -> Result<Box<dyn PageSource>> {
    match config.fetcher.trim().to_ascii_lowercase().as_str() {
        "browser" | "chrome" => Ok(Box::new(BrowserFetcher::new(config))),
        "http" => Ok(Box::new(HttpFetcher::new(config)?)),
        other => Err(NessfixError::Config(format!(
            "Unknown fetcher {:?}, expected \"browser\" or \"http\"",
            other
        ))),
    }
}

/// Headless Chromium, polled until the fixtures table is populated.
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    url: String,
    user_agent: String,
    accept_language: String,
    timeout: Duration,
    min_rows: usize,
}

impl BrowserFetcher {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            url: config.url.clone(),
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
            timeout: config.fetch_timeout(),
            min_rows: config.min_fixture_rows,
        }
    }

    fn fetch_blocking(&self) -> Result<String> {
        // the budget covers launch and navigation too
        let started = Instant::now();
        let launch_options = LaunchOptions {
            headless: true,
            sandbox: false,
            idle_browser_timeout: self.timeout + Duration::from_secs(30),
            ..Default::default()
        };

        let browser = Browser::new(launch_options).map_err(|e| browser_error("launch headless browser", e))?;
        let tab = browser.new_tab().map_err(|e| browser_error("create new tab", e))?;

        tab.set_user_agent(&self.user_agent, Some(&self.accept_language), None)
            .map_err(|e| browser_error("set user agent", e))?;

        let patterns = blocked_request_patterns();
        tab.enable_fetch(Some(patterns.as_slice()), None)
            .map_err(|e| browser_error("enable request interception", e))?;
        tab.enable_request_interception(Arc::new(
            |_transport: Arc<Transport>, _session: SessionId, event: RequestPausedEvent| {
                RequestPausedDecision::Fail(FailRequest {
                    request_id: event.params.request_id,
                    error_reason: ErrorReason::BlockedByClient,
                })
            },
        ))
        .map_err(|e| browser_error("enable request interception", e))?;

        info!("Navigating to: {}", self.url);
        tab.navigate_to(&self.url).map_err(|e| browser_error("navigate", e))?;
        if let Err(e) = tab.wait_until_navigated() {
            // the tables may still arrive; the poll below decides
            debug!("Navigation did not settle: {}", e);
        }

        loop {
            match tab.get_content() {
                Ok(html) if html_fixtures_ready(&html, self.min_rows) => {
                    info!("Fixtures table ready after {:.1}s", started.elapsed().as_secs_f32());
                    return Ok(html);
                }
                Ok(_) => debug!("Fixtures table not ready yet"),
                Err(e) => debug!("Failed to read page content: {}", e),
            }

            if started.elapsed() >= self.timeout {
                return Err(NessfixError::FetchTimeout {
                    url: self.url.clone(),
                    waited: self.timeout,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

fn browser_error(action: &str, e: impl std::fmt::Display) -> NessfixError {
    NessfixError::Browser(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl PageSource for BrowserFetcher {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_html(&self) -> Result<String> {
        let fetcher = self.clone();
        tokio::task::spawn_blocking(move || fetcher.fetch_blocking())
            .await
            .map_err(|e| NessfixError::Browser(format!("Browser task aborted: {}", e)))?
    }
}

/// Plain GET without script execution; only useful when the tables are
/// server-rendered.
pub struct HttpFetcher {
    client: Client,
    url: String,
    min_rows: usize,
}

impl HttpFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let language = HeaderValue::from_str(&config.accept_language)
            .map_err(|e| NessfixError::Config(format!("Invalid accept_language: {}", e)))?;
        headers.insert(ACCEPT_LANGUAGE, language);

        let client = Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            min_rows: config.min_fixture_rows,
        })
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_html(&self) -> Result<String> {
        let started = Instant::now();
        info!("Fetching league page from {}", self.url);

        let html = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        if !html_fixtures_ready(&html, self.min_rows) {
            return Err(NessfixError::FetchTimeout {
                url: self.url.clone(),
                waited: started.elapsed(),
            });
        }
        Ok(html)
    }
}

/// Markup already in hand: a saved page or a test fixture.
#[derive(Debug, Clone)]
pub struct StaticPage {
    label: String,
    html: String,
}

impl StaticPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            label: "static page".to_string(),
            html: html.into(),
        }
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        Ok(Self {
            label: path.display().to_string(),
            html: std::fs::read_to_string(path)?,
        })
    }
}

#[async_trait]
impl PageSource for StaticPage {
    fn url(&self) -> &str {
        &self.label
    }

    async fn fetch_html(&self) -> Result<String> {
        Ok(self.html.clone())
    }
}
