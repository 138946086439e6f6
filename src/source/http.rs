//! HTTP client for the Budget Status service.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::BudgetSource;
use crate::budget::{parse_snapshot, BudgetRecord};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetches `GET {base}/budgets/status?user_id={user}`.
pub struct HttpBudgetSource {
    client: reqwest::Client,
    status_url: Url,
}

impl HttpBudgetSource {
    pub fn new(base_url: &str, user_id: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            status_url: status_url(base_url, user_id)?,
        })
    }

    pub fn status_url(&self) -> &Url {
        &self.status_url
    }
}

fn status_url(base_url: &str, user_id: &str) -> anyhow::Result<Url> {
    // `Url::join` replaces the last path segment unless the base ends in '/'.
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    let mut url = Url::parse(&base)?.join("budgets/status")?;
    url.query_pairs_mut().append_pair("user_id", user_id);
    Ok(url)
}

#[async_trait]
impl BudgetSource for HttpBudgetSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self) -> anyhow::Result<Vec<BudgetRecord>> {
        let response = self
            .client
            .get(self.status_url.clone())
            .send()
            .await?
            .error_for_status()?;
        let body: Value = response.json().await?;

        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let reason = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            anyhow::bail!("Budget status service reported failure: {}", reason);
        }

        let records = parse_snapshot(&body)?;
        tracing::debug!(url = %self.status_url, budgets = records.len(), "Fetched budget status");
        Ok(records)
    }
}
