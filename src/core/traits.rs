use async_trait::async_trait;

use super::{error::LlmError, types::IdentifyingParams};

/// A backend that turns a prompt into generated text.
///
/// Callers should depend on this trait rather than on a concrete client so
/// backends can be swapped.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Short tag naming the backend, e.g. `"oobabooga"`.
    fn llm_type(&self) -> &'static str;

    /// Generate a completion for `prompt`.
    ///
    /// `stop` lists sequences at which generation should end; backends that
    /// do not forward them treat the argument as informational.
    async fn complete(&self, prompt: &str, stop: Option<&[String]>) -> Result<String, LlmError>;

    fn identifying_params(&self) -> IdentifyingParams;
}
