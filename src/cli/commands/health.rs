use anyhow::{anyhow, Context};
use serde_json::Value;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::config;

pub async fn handle(url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let base = url.unwrap_or_else(|| format!("http://localhost:{}", config().api.port));
    let endpoint = format!("{}/health", base.trim_end_matches('/'));

    let response = reqwest::get(&endpoint)
        .await
        .with_context(|| format!("failed to reach {}", endpoint))?;
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        return Err(anyhow!("{} answered {}: {}", endpoint, status, body));
    }

    output_success(output_format, &format!("{} is healthy", base), Some(body))
}
