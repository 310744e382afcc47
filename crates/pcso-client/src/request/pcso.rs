use chrono::NaiveDate;
use reqwest::header::{self, HeaderMap, HeaderValue};

use super::{Retrieval, RowSource, Unavailable};
use crate::config::ScrapeConfig;

pub mod page;

/// Date layout the search form expects
const FORM_DATE_FORMAT: &str = "%m/%d/%Y";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

/// Scrapes the public results search page for one date range
#[derive(Debug, Clone)]
pub struct PcsoScraper {
    client: reqwest::Client,
    config: ScrapeConfig,
    start: NaiveDate,
    end: NaiveDate,
}

impl PcsoScraper {
    pub fn new(config: &ScrapeConfig, start: NaiveDate, end: NaiveDate) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(browser_headers())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            start,
            end,
        })
    }

    async fn pause(&self) {
        let delay = self.config.request_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Body of a response, or why the site cannot be used
    async fn read_page(
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<String, Unavailable> {
        let response = response.map_err(|e| Unavailable::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Unavailable::Transport(e.to_string()))?;

        if let Some(denied) = page::access_denied(status.as_u16(), &body) {
            return Err(denied);
        }
        if !status.is_success() {
            return Err(Unavailable::Status {
                status: status.as_u16(),
            });
        }
        Ok(body)
    }

    async fn scrape(&self) -> Result<Vec<pcso_core::RawRow>, Unavailable> {
        let url = self.config.base_url.as_str();

        self.pause().await;
        log::info!("Loading results page {url}");
        let body = Self::read_page(self.client.get(url).send().await).await?;

        let form = page::FormState::extract(&body).ok_or(Unavailable::MissingFormState)?;
        let start = self.start.format(FORM_DATE_FORMAT).to_string();
        let end = self.end.format(FORM_DATE_FORMAT).to_string();

        self.pause().await;
        log::info!("Submitting search for {start} to {end}");
        let body = Self::read_page(
            self.client
                .post(url)
                .form(&form.search_fields(&start, &end))
                .send()
                .await,
        )
        .await?;

        page::parse_results(&body).ok_or(Unavailable::NoResultsTable)
    }
}

impl RowSource for PcsoScraper {
    fn name(&self) -> &'static str {
        "pcso-scrape"
    }

    async fn retrieve(&self) -> anyhow::Result<Retrieval> {
        match self.scrape().await {
            Ok(rows) => {
                log::info!("Scraped {} rows from the results site", rows.len());
                Ok(Retrieval::Rows(rows))
            }
            Err(reason) => {
                log::warn!("Results site unavailable: {reason}");
                Ok(Retrieval::Unavailable(reason))
            }
        }
    }
}
