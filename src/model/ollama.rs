use super::{LlmBackend, SamplingParams};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Request body for Ollama's /api/generate
#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

impl From<&SamplingParams> for GenerateOptions {
    fn from(p: &SamplingParams) -> Self {
        Self { temperature: p.temperature, num_predict: p.max_tokens }
    }
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<LocalModel>,
}

#[derive(Deserialize)]
struct LocalModel {
    name: String,
}

/// Client for a locally running Ollama server.
#[derive(Clone)]
pub struct OllamaBackend {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of the models already pulled into the local runtime.
    pub async fn list_local_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let res = self.http.get(&url).send().await?;
        if !res.status().is_success() {
            return Err(Error::Generation(format!("GET {url}: {}", res.status())));
        }
        let tags: TagsResponse = res
            .json()
            .await
            .map_err(|e| Error::Generation(format!("GET {url}: unreadable tags: {e}")))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait::async_trait]
impl LlmBackend for OllamaBackend {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        params: Option<&SamplingParams>,
    ) -> Result<Vec<u8>> {
        let body = GenerateBody { model, prompt, stream: false, options: params.map(Into::into) };
        let url = format!("{}/api/generate", self.base_url);
        tracing::debug!(%url, model, "POST generate");

        let res = self.http.post(&url).json(&body).send().await?;
        let status = res.status();
        let bytes = res
            .bytes()
            .await
            .map_err(|e| Error::Generation(format!("{model}: reading response body: {e}")))?;
        if !status.is_success() {
            let detail = serde_json::from_slice::<serde_json::Value>(&bytes)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
            return Err(Error::Generation(format!("{model}: {status}: {detail}")));
        }
        Ok(bytes.to_vec())
    }
}
