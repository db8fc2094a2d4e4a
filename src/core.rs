pub mod error;
pub mod http;
pub mod traits;
pub mod types;

pub use error::LlmError;
pub use http::{HttpClient, HttpClientConfig};
pub use traits::TextCompletion;
pub use types::{IdentifyingParams, ModelParameters, SamplingParameters};
