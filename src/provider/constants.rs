pub mod oobabooga {
    pub const LLM_TYPE: &str = "oobabooga";
    pub const CHAT_COMPLETIONS_ENDPOINT: &str = "/v1/chat/completions";
    pub const DEFAULT_MODE: &str = "instruct";
    pub const DEFAULT_INSTRUCTION_TEMPLATE: &str = "template1";
}
