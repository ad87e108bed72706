pub mod llm_chat_request;
pub mod llm_chat_route;
