use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::app::feed::{parse_csv, parse_gviz, FeedSource};
use crate::config::{FeedFormat, WidgetConfig};
use crate::domain::notification::RawRow;
use crate::error::WidgetError;

const SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d/";
const REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// Public Google Sheets export, read through the gviz query endpoint.
#[derive(Clone)]
pub struct SheetsFeed {
    client: Client,
    url: Url,
    format: FeedFormat,
}

impl SheetsFeed {
    pub fn new(spreadsheet_id: &str, sheet_gid: &str, format: FeedFormat) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;
        Ok(Self {
            client,
            url: export_url(spreadsheet_id, sheet_gid, format)?,
            format,
        })
    }

    pub fn from_config(config: &WidgetConfig) -> Result<Self> {
        let spreadsheet_id = config
            .spreadsheet_id
            .as_deref()
            .ok_or_else(|| anyhow!("missing spreadsheet id"))?;
        Self::new(spreadsheet_id, &config.sheet_gid, config.feed_format)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// `{base}{id}/gviz/tq?tqx=out:csv&gid={gid}`
pub fn export_url(spreadsheet_id: &str, sheet_gid: &str, format: FeedFormat) -> Result<Url> {
    let spreadsheet_id = spreadsheet_id.trim();
    if spreadsheet_id.is_empty() || spreadsheet_id.contains('/') {
        return Err(anyhow!("invalid spreadsheet id: {:?}", spreadsheet_id));
    }

    let mut url = Url::parse(SHEETS_BASE_URL)?.join(&format!("{}/gviz/tq", spreadsheet_id))?;
    url.query_pairs_mut()
        .append_pair("tqx", format.as_tqx())
        .append_pair("gid", sheet_gid.trim());
    Ok(url)
}

#[async_trait]
impl FeedSource for SheetsFeed {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, WidgetError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|err| WidgetError::feed(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WidgetError::feed(format!("HTTP status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|err| WidgetError::feed(err.to_string()))?;

        match self.format {
            FeedFormat::Csv => Ok(parse_csv(&body)),
            FeedFormat::Json => parse_gviz(&body),
        }
    }
}
