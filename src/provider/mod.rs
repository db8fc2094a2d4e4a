mod constants;
pub(crate) mod oobabooga;

pub use constants::oobabooga::LLM_TYPE as OOBABOOGA_LLM_TYPE;
pub use oobabooga::{OobaboogaClient, OobaboogaConfig};
