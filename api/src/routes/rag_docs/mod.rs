pub mod rag_docs_response;
pub mod rag_docs_route;
