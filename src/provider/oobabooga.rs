//! Client for text-generation-webui ("oobabooga") servers.
//!
//! The server's OpenAI-style chat route is used in instruct mode with a single
//! user message per call. Sampling parameters and stop sequences are only put
//! on the wire when forwarding is enabled with
//! [`OobaboogaConfig::with_forward_generation_params`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{
    HttpClient, HttpClientConfig, IdentifyingParams, LlmError, ModelParameters,
    SamplingParameters, TextCompletion,
};
use crate::provider::constants::oobabooga;

#[derive(Debug, Clone, PartialEq)]
pub struct OobaboogaConfig {
    pub base_url: String,
    /// Informational only, never sent to the server.
    pub model_name: String,
    pub mode: String,
    pub instruction_template: String,
    pub sampling: SamplingParameters,
    /// Send sampling parameters and stop sequences with each request.
    pub forward_generation_params: bool,
    pub http_config: HttpClientConfig,
}

impl OobaboogaConfig {
    pub fn new(base_url: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model_name: model_name.into(),
            mode: oobabooga::DEFAULT_MODE.to_string(),
            instruction_template: oobabooga::DEFAULT_INSTRUCTION_TEMPLATE.to_string(),
            sampling: SamplingParameters::default(),
            forward_generation_params: false,
            http_config: HttpClientConfig::default(),
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingParameters) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.sampling.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.sampling.top_p = top_p;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.sampling.top_k = top_k;
        self
    }

    pub fn with_n_batch(mut self, n_batch: u32) -> Self {
        self.sampling.n_batch = n_batch;
        self
    }

    pub fn with_n_threads(mut self, n_threads: u32) -> Self {
        self.sampling.n_threads = n_threads;
        self
    }

    pub fn with_n_predict(mut self, n_predict: u32) -> Self {
        self.sampling.n_predict = n_predict;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.sampling.max_tokens = max_tokens;
        self
    }

    pub fn with_repeat_last_n(mut self, repeat_last_n: u32) -> Self {
        self.sampling.repeat_last_n = repeat_last_n;
        self
    }

    pub fn with_repeat_penalty(mut self, repeat_penalty: f64) -> Self {
        self.sampling.repeat_penalty = repeat_penalty;
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn with_instruction_template(mut self, template: impl Into<String>) -> Self {
        self.instruction_template = template.into();
        self
    }

    pub fn with_forward_generation_params(mut self, forward: bool) -> Self {
        self.forward_generation_params = forward;
        self
    }

    pub fn with_http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Full URL of the chat completions route.
    pub fn chat_completions_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            oobabooga::CHAT_COMPLETIONS_ENDPOINT
        )
    }
}

pub struct OobaboogaClient {
    config: OobaboogaConfig,
    http: HttpClient,
}

impl OobaboogaClient {
    /// Build a client. No network traffic happens until the first completion.
    pub fn new(config: OobaboogaConfig) -> Self {
        let http = HttpClient::new(config.http_config.clone(), None);
        Self { config, http }
    }

    #[tracing::instrument(
        name = "text_completion",
        skip(self, prompt, stop),
        fields(
            llm_type = oobabooga::LLM_TYPE,
            model = %self.config.model_name,
            prompt_len = prompt.len()
        ),
        err
    )]
    async fn generate(&self, prompt: &str, stop: Option<&[String]>) -> Result<String, LlmError> {
        if prompt.is_empty() {
            return Err(LlmError::InvalidRequest("Prompt must not be empty".to_string()));
        }

        let request = build_request(&self.config, prompt, stop);
        let url = self.config.chat_completions_url();

        let response: ChatCompletionResponse = self.http.post_json(&url, &request).await?;
        let content = extract_content(response)?;

        tracing::debug!(completion_len = content.len(), "Received completion");
        Ok(content)
    }
}

#[async_trait]
impl TextCompletion for OobaboogaClient {
    fn llm_type(&self) -> &'static str {
        oobabooga::LLM_TYPE
    }

    async fn complete(&self, prompt: &str, stop: Option<&[String]>) -> Result<String, LlmError> {
        self.generate(prompt, stop).await
    }

    fn identifying_params(&self) -> IdentifyingParams {
        IdentifyingParams {
            model_name: self.config.model_name.clone(),
            model_parameters: ModelParameters::from(&self.config.sampling),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum MessageRole {
    User,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: MessageRole,
    content: &'a str,
}

/// Sampling fields under the names the server's chat route understands.
#[derive(Debug, Serialize)]
struct GenerationFields<'a> {
    temperature: f64,
    top_p: f64,
    top_k: u32,
    max_tokens: u32,
    repetition_penalty: f64,
    repetition_penalty_range: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    mode: &'a str,
    instruction_template: &'a str,
    #[serde(flatten)]
    generation: Option<GenerationFields<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

fn build_request<'a>(
    config: &'a OobaboogaConfig,
    prompt: &'a str,
    stop: Option<&'a [String]>,
) -> ChatCompletionRequest<'a> {
    let generation = config
        .forward_generation_params
        .then(|| GenerationFields {
            temperature: config.sampling.temperature,
            top_p: config.sampling.top_p,
            top_k: config.sampling.top_k,
            max_tokens: config.sampling.max_tokens,
            repetition_penalty: config.sampling.repeat_penalty,
            repetition_penalty_range: config.sampling.repeat_last_n,
            stop: stop.filter(|s| !s.is_empty()),
        });

    ChatCompletionRequest {
        messages: vec![ChatMessage {
            role: MessageRole::User,
            content: prompt,
        }],
        mode: &config.mode,
        instruction_template: &config.instruction_template,
        generation,
    }
}

fn extract_content(response: ChatCompletionResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| LlmError::MalformedResponse {
            message: "No choices in response".to_string(),
            source: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> OobaboogaConfig {
        OobaboogaConfig::new("http://localhost:5000", "m1")
    }

    #[test]
    fn default_body_carries_only_message_mode_and_template() {
        let config = config();
        let stop = vec!["###".to_string()];
        let body =
            serde_json::to_value(build_request(&config, "hi", Some(stop.as_slice()))).unwrap();

        assert_eq!(
            body,
            json!({
                "messages": [{ "role": "user", "content": "hi" }],
                "mode": "instruct",
                "instruction_template": "template1"
            })
        );
    }

    #[test]
    fn forwarding_adds_sampling_fields_and_stop() {
        let config = config()
            .with_temperature(0.5)
            .with_repeat_last_n(32)
            .with_forward_generation_params(true);
        let stop = vec!["###".to_string(), "\nUser:".to_string()];
        let body =
            serde_json::to_value(build_request(&config, "hi", Some(stop.as_slice()))).unwrap();

        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["top_p"], 0.1);
        assert_eq!(body["repetition_penalty"], 1.18);
        assert_eq!(body["top_k"], 40);
        assert_eq!(body["max_tokens"], 200);
        assert_eq!(body["repetition_penalty_range"], 32);
        assert_eq!(body["stop"], json!(["###", "\nUser:"]));
        assert!(body.get("n_predict").is_none());
        assert!(body.get("n_threads").is_none());
    }

    #[test]
    fn forwarding_without_stop_omits_stop_key() {
        let config = config().with_forward_generation_params(true);
        let body = serde_json::to_value(build_request(&config, "hi", None)).unwrap();

        assert!(body.get("stop").is_none());
        assert!(body.get("temperature").is_some());
    }

    #[test]
    fn prompt_is_sent_verbatim() {
        let config = config();
        let prompt = "  line one\n\t\"quoted\" \\ ünïcödé  ";
        let body = serde_json::to_value(build_request(&config, prompt, None)).unwrap();

        assert_eq!(body["messages"][0]["content"], prompt);
    }

    #[test]
    fn chat_completions_url_joins_base_url() {
        assert_eq!(
            config().chat_completions_url(),
            "http://localhost:5000/v1/chat/completions"
        );
        let trailing = OobaboogaConfig::new("http://localhost:5000/", "m1");
        assert_eq!(
            trailing.chat_completions_url(),
            "http://localhost:5000/v1/chat/completions"
        );
    }

    #[test]
    fn identifying_params_reflect_overrides_and_defaults() {
        let client = OobaboogaClient::new(config().with_temperature(0.5));
        let params = client.identifying_params();

        assert_eq!(params.model_name, "m1");
        assert_eq!(params.model_parameters.temp, 0.5);

        let defaults = SamplingParameters::default();
        assert_eq!(params.model_parameters.max_tokens, defaults.max_tokens);
        assert_eq!(params.model_parameters.n_predict, defaults.n_predict);
        assert_eq!(params.model_parameters.top_k, defaults.top_k);
        assert_eq!(params.model_parameters.top_p, defaults.top_p);
        assert_eq!(params.model_parameters.n_batch, defaults.n_batch);
        assert_eq!(params.model_parameters.repeat_penalty, defaults.repeat_penalty);
        assert_eq!(params.model_parameters.repeat_last_n, defaults.repeat_last_n);
    }

    #[test]
    fn llm_type_is_oobabooga() {
        let client = OobaboogaClient::new(config());
        assert_eq!(client.llm_type(), "oobabooga");
    }

    #[test]
    fn extract_content_reads_first_choice() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "first" } },
                { "index": 1, "message": { "role": "assistant", "content": "second" } }
            ]
        }))
        .unwrap();

        assert_eq!(extract_content(response).unwrap(), "first");
    }

    #[test]
    fn extract_content_rejects_empty_choices() {
        let response: ChatCompletionResponse =
            serde_json::from_value(json!({ "choices": [] })).unwrap();

        match extract_content(response) {
            Err(LlmError::MalformedResponse { message, .. }) => {
                assert!(message.contains("No choices"))
            }
            other => panic!("Expected MalformedResponse, got {:?}", other),
        }
    }
}
