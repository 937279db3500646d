use anyhow::{bail, Context, Result};
use serde::{Serialize, Deserialize};
use std::time::Duration;

use crate::settings::SummarizerConfig;

// Seam between the summarization logic and the remote service, so the
// chunking and stitching paths can run against a canned generator in tests.
pub trait Generate {
    fn generate(&self, input: &str) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    summary_text: String,
}

// Client for the hosted inference endpoint of a summarization model.
// One POST per generation call, no retries; the caller decides what a
// failed call means for the unit being summarized.
pub struct InferenceClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl InferenceClient {
    pub fn new(settings: &SummarizerConfig, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build the HTTP client")?;

        let url = format!("{}/{}", settings.endpoint.trim_end_matches('/'), settings.model);

        Ok(InferenceClient { http, url, api_key })
    }
}

impl Generate for InferenceClient {
    async fn generate(&self, input: &str) -> Result<String> {
        let response = self.http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&GenerationRequest { inputs: input })
            .send()
            .await
            .context("Generation request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Generation service returned {}", status);
        }

        let outputs: Vec<GenerationResponse> = response
            .json()
            .await
            .context("Generation response was not in the expected shape")?;

        match outputs.into_iter().next() {
            Some(output) => Ok(output.summary_text),
            None => bail!("Generation service returned an empty result list"),
        }
    }
}
