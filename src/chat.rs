// =============================================================================
// Chat Proxy — OpenAI-compatible chat completions client
// =============================================================================
//
// Forwards free-text questions about stocks to the language-model API and
// returns the answer string. The client is constructed exactly once at
// startup with the credential taken from the environment, then shared by
// reference through AppState — handlers never build clients and the key is
// never logged or serialized.
// =============================================================================

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, instrument};

/// Chat completions host used when none is injected.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Steers answers toward stock/symbol questions, away from the symbols the
/// dashboard already covers.
const SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer about stocks and their \
     symbols. Suggest symbols other than these - \
     sensex,nifty,AAPL,AMZN,RELI,INTC,NVDA,F,TSLA,META,MSFT,GOOG";

/// Language-model API client for the question-answering endpoint.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ChatClient {
    /// Create a client against the public endpoint.
    ///
    /// # Arguments
    /// * `api_key` — bearer credential, sourced from the environment at
    ///   startup.
    /// * `model`   — completion model name, e.g. `gpt-4o-mini`.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, model)
    }

    /// Create a client against a specific host (tests, compatible gateways).
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Ask the model a question and return the answer text.
    #[instrument(skip(self, question), name = "chat::ask")]
    pub async fn ask(&self, question: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = request_body(&self.model, question);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse chat completion response")?;

        if !status.is_success() {
            anyhow::bail!("chat API returned {status}: {body}");
        }

        let answer = extract_answer(&body)?;
        debug!(chars = answer.len(), "chat answer received");
        Ok(answer)
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Build the chat completions request payload.
fn request_body(model: &str, question: &str) -> serde_json::Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": question },
        ],
    })
}

/// Pull the first choice's message content out of the response.
fn extract_answer(body: &serde_json::Value) -> Result<String> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .context("chat response missing message content")
}
