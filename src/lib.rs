//! # textgen
//!
//! Use a remote text-generation-webui server as if it were a local language model.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use textgen::{OobaboogaClient, OobaboogaConfig, TextCompletion};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OobaboogaClient::new(
//!         OobaboogaConfig::new("http://127.0.0.1:5000", "llama-2-13b").with_temperature(0.5),
//!     );
//!
//!     let answer = client.complete("Name three primary colors.", None).await?;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```
//!
//! Sampling parameters are reported by
//! [`TextCompletion::identifying_params`] but are not sent to the server unless
//! [`OobaboogaConfig::with_forward_generation_params`] is enabled.

pub mod core;
pub mod provider;

pub use core::{
    HttpClientConfig, IdentifyingParams, LlmError, ModelParameters, SamplingParameters,
    TextCompletion,
};
pub use provider::{OOBABOOGA_LLM_TYPE, OobaboogaClient, OobaboogaConfig};
