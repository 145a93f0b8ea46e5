//! Google Translate adapter.
//!
//! Uses the public `translate_a/single` endpoint (no API key). The response is
//! a nested JSON array whose first element lists translated segments.

use std::time::Duration;

use async_trait::async_trait;

use gtb_core::{errors::Error, ports::Translator, Result};

#[derive(Clone, Debug)]
pub struct GoogleTranslator {
    endpoint: String,
    http: reqwest::Client,
}

impl GoogleTranslator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("translate client build error: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| Error::External(format!("translate request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::External(format!(
                "translate failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::External(format!("translate json error: {e}")))?;

        let out = parse_segments(&v)?;
        tracing::debug!(target_lang = target, chars = out.chars().count(), "translated");
        Ok(out)
    }
}

/// Join the translated segments of a `translate_a/single` response.
fn parse_segments(v: &serde_json::Value) -> Result<String> {
    let segments = v
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| Error::External("translate response has no segments".to_string()))?;

    let text: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        return Err(Error::External(
            "translate returned empty text".to_string(),
        ));
    }
    Ok(text)
}
