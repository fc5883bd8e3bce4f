//! HTTP webhook sink.
//!
//! POSTs flattened rows as a JSON array to a configured endpoint (for
//! example a spreadsheet's apps-script URL). The institution name is also
//! sent as a query parameter so the receiving side can route by tab.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::{RemoteSink, SheetRow};

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    institution: &'a str,
    rows: &'a [SheetRow],
}

pub struct WebhookSink {
    http: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: String, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent("EduSupply/0.1.0")
            .build()
            .context("Failed to build webhook HTTP client")?;
        Ok(Self { http, url })
    }

    /// Endpoint with the institution appended as a query parameter.
    fn endpoint(&self, institution: &str) -> String {
        let sep = if self.url.contains('?') { '&' } else { '?' };
        format!(
            "{}{sep}institution={}",
            self.url,
            urlencoding::encode(institution)
        )
    }
}

#[async_trait]
impl RemoteSink for WebhookSink {
    async fn push_rows(&self, institution: &str, rows: &[SheetRow]) -> Result<()> {
        let url = self.endpoint(institution);
        debug!(rows = rows.len(), "Posting rows to webhook");

        let resp = self
            .http
            .post(&url)
            .json(&WebhookPayload { institution, rows })
            .send()
            .await
            .context("Webhook request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Webhook returned {status}: {body}");
        }
        Ok(())
    }

    fn name(&self) -> String {
        "webhook".to_string()
    }
}
