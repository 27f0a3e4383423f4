use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

use crate::app::avatar::{ImageProbe, ProbeOutcome};

/// Checks that a URL answers with an image. Timeouts are enforced by the
/// resolver.
#[derive(Clone)]
pub struct HttpImageProbe {
    client: Client,
}

impl HttpImageProbe {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
        })
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn probe(&self, url: &Url) -> ProbeOutcome {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, url = %url, "image request failed");
                return ProbeOutcome::Failed;
            }
        };

        let is_image = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |value| value.starts_with("image/"));

        if response.status().is_success() && is_image {
            ProbeOutcome::Loaded
        } else {
            tracing::debug!(status = %response.status(), url = %url, "image not usable");
            ProbeOutcome::Failed
        }
    }
}
