use serde::Serialize;

/// Sampling knobs collected per client.
///
/// Whether they reach the remote service depends on the provider's
/// forwarding setting; they are always reported by `identifying_params`.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParameters {
    /// Sampling temperature
    pub temperature: f64,
    /// Nucleus sampling parameter (0.0 to 1.0)
    pub top_p: f64,
    pub top_k: u32,
    /// Batch size for prompt processing
    pub n_batch: u32,
    pub n_threads: u32,
    /// Maximum number of tokens to predict
    pub n_predict: u32,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Window of most recent tokens the repeat penalty applies to
    pub repeat_last_n: u32,
    pub repeat_penalty: f64,
}

impl Default for SamplingParameters {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.1,
            top_k: 40,
            n_batch: 8,
            n_threads: 4,
            n_predict: 256,
            max_tokens: 200,
            repeat_last_n: 64,
            repeat_penalty: 1.18,
        }
    }
}

/// Snapshot of a client's configuration, for tracing and debugging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifyingParams {
    pub model_name: String,
    pub model_parameters: ModelParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelParameters {
    pub max_tokens: u32,
    pub n_predict: u32,
    pub top_k: u32,
    pub top_p: f64,
    pub temp: f64,
    pub n_batch: u32,
    pub repeat_penalty: f64,
    pub repeat_last_n: u32,
}

impl From<&SamplingParameters> for ModelParameters {
    fn from(params: &SamplingParameters) -> Self {
        Self {
            max_tokens: params.max_tokens,
            n_predict: params.n_predict,
            top_k: params.top_k,
            top_p: params.top_p,
            temp: params.temperature,
            n_batch: params.n_batch,
            repeat_penalty: params.repeat_penalty,
            repeat_last_n: params.repeat_last_n,
        }
    }
}
