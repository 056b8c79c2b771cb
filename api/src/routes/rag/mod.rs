pub mod index_route;
pub mod query_route;
pub mod rag_request;
pub mod search_route;
