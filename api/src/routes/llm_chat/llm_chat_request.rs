use serde::{Deserialize, Serialize};

fn default_max_new_tokens() -> u32 {
    128
}

/// Request payload for /llm/chat.
#[derive(Debug, Deserialize)]
pub struct LlmChatRequest {
    pub prompt: String,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
}

/// Response payload for /llm/chat.
#[derive(Debug, Serialize)]
pub struct LlmChatResponse {
    pub response: String,
}
