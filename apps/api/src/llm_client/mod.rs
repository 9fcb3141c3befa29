/// Model Gateway: the single point of entry for all generative-model calls.
///
/// ARCHITECTURAL RULE: sessions never build HTTP requests themselves.
/// Every call goes through a `ModelGateway` handed to them at construction,
/// so tests can substitute a scripted gateway.
///
/// One network call per invocation: no caching, no retry, no streaming.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;

pub mod fallback;
pub mod prompts;

pub use fallback::{recover, Fallback, Generated};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model returned empty content")]
    EmptyContent,

    #[error("structured output has no value for `{field}`")]
    IncompleteOutput { field: &'static str },
}

/// Whether the model may spend tokens on internal reasoning before answering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Thinking {
    #[default]
    ModelDefault,
    /// Zero thinking budget. Used for short conversational turns.
    Disabled,
}

/// One required string field of a structured-output contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaField {
    pub name: &'static str,
    pub description: &'static str,
}

/// Field-name contract the model is asked to conform to.
///
/// Every field is a required string; a response missing any of them, or
/// holding a blank value, is rejected as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSchema {
    pub fields: &'static [SchemaField],
}

impl OutputSchema {
    pub const fn new(fields: &'static [SchemaField]) -> Self {
        Self { fields }
    }

    /// Renders the schema in the service's `responseSchema` dialect.
    pub fn to_response_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| {
                (
                    f.name.to_string(),
                    json!({ "type": "STRING", "description": f.description }),
                )
            })
            .collect();
        let names: Vec<&str> = self.fields.iter().map(|f| f.name).collect();

        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": names,
            "propertyOrdering": names,
        })
    }

    fn check_complete(&self, value: &Value) -> Result<(), GatewayError> {
        for field in self.fields {
            let present = value
                .get(field.name)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.trim().is_empty());
            if !present {
                return Err(GatewayError::IncompleteOutput { field: field.name });
            }
        }
        Ok(())
    }
}

/// A single prompt sent to the model, optionally with an output schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub schema: Option<OutputSchema>,
    pub thinking: Thinking,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            schema: None,
            thinking: Thinking::ModelDefault,
        }
    }

    pub fn structured(prompt: impl Into<String>, schema: OutputSchema) -> Self {
        Self {
            prompt: prompt.into(),
            schema: Some(schema),
            thinking: Thinking::ModelDefault,
        }
    }

    pub fn with_thinking(mut self, thinking: Thinking) -> Self {
        self.thinking = thinking;
        self
    }
}

/// Adapter boundary to the hosted generation service.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    /// Performs one call and returns the raw generated text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError>;
}

/// Calls the gateway and returns free text. Blank output is an error.
pub async fn generate_text(
    gateway: &dyn ModelGateway,
    request: &GenerationRequest,
) -> Result<String, GatewayError> {
    let text = gateway.generate(request).await?;
    if text.trim().is_empty() {
        return Err(GatewayError::EmptyContent);
    }
    Ok(text)
}

/// Calls the gateway and parses the response into `T`.
///
/// Malformed JSON is an error, never a silent fallback. When the request
/// carries a schema, every schema field must hold a non-blank string.
pub async fn generate_structured<T: DeserializeOwned>(
    gateway: &dyn ModelGateway,
    request: &GenerationRequest,
) -> Result<T, GatewayError> {
    let text = generate_text(gateway, request).await?;
    let value: Value = serde_json::from_str(strip_json_fences(&text))?;
    if let Some(schema) = &request.schema {
        schema.check_complete(&value)?;
    }
    Ok(serde_json::from_value(value)?)
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini REST client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Concatenates the answer parts of the first candidate, skipping thought summaries.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorWrapper {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn build_request_body(request: &GenerationRequest) -> GenerateContentRequest<'_> {
    let mut config = GenerationConfig::default();
    if let Some(schema) = &request.schema {
        config.response_mime_type = Some("application/json");
        config.response_schema = Some(schema.to_response_schema());
    }
    if request.thinking == Thinking::Disabled {
        config.thinking_config = Some(ThinkingConfig { thinking_budget: 0 });
    }
    let has_config = config.response_mime_type.is_some() || config.thinking_config.is_some();

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        generation_config: has_config.then_some(config),
    }
}

/// `ModelGateway` over the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl ModelGateway for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);
        let body = build_request_body(request);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorWrapper>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Model call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        parsed.text().ok_or(GatewayError::EmptyContent)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Scripted in-memory gateway for session and router tests.
#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tokio::sync::{Notify, Semaphore};

    use super::{GatewayError, GenerationRequest, ModelGateway};

    /// Holds calls inside the gateway until released.
    #[derive(Clone)]
    pub struct Gate {
        entered: Arc<Notify>,
        release: Arc<Semaphore>,
    }

    impl Gate {
        /// Resolves once a call is parked inside the gateway.
        pub async fn entered(&self) {
            self.entered.notified().await;
        }

        pub fn release(&self) {
            self.release.add_permits(1);
        }
    }

    #[derive(Default)]
    pub struct ScriptedGateway {
        script: Mutex<VecDeque<Result<String, u16>>>,
        requests: Mutex<Vec<GenerationRequest>>,
        gate: Option<Gate>,
    }

    impl ScriptedGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_reply(self, reply: impl Into<String>) -> Self {
            self.script.lock().unwrap().push_back(Ok(reply.into()));
            self
        }

        /// Queues a service failure with the given HTTP status.
        pub fn with_failure(self, status: u16) -> Self {
            self.script.lock().unwrap().push_back(Err(status));
            self
        }

        pub fn gated(mut self) -> (Self, Gate) {
            let gate = Gate {
                entered: Arc::new(Notify::new()),
                release: Arc::new(Semaphore::new(0)),
            };
            self.gate = Some(gate.clone());
            (self, gate)
        }

        pub fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ModelGateway for ScriptedGateway {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
            let call_number = {
                let mut requests = self.requests.lock().unwrap();
                requests.push(request.clone());
                requests.len()
            };

            if let Some(gate) = &self.gate {
                gate.entered.notify_one();
                gate.release.acquire().await.unwrap().forget();
            }

            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(status)) => Err(GatewayError::Api {
                    status,
                    message: "scripted failure".to_string(),
                }),
                None => Ok(format!("scripted reply #{call_number}")),
            }
        }
    }
}
