pub mod rag_query_request;
pub mod rag_query_route;
