pub mod llm_chat;
pub mod question;
pub mod rag_docs;
pub mod rag_query;
