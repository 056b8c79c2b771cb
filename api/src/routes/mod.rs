pub mod embeddings_cost_route;
pub mod health_route;
pub mod rag;
