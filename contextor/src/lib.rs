//! RAG orchestration for course content.
//!
//! Public API: [`RagPipeline`]. A query embeds the question, retrieves ranked
//! passages scoped to a course, packs them into a token-bounded context,
//! asks the generative model, and scores the answer's confidence.
//!
//! ```no_run
//! # use contextor::{QueryOptions, RagPipeline};
//! # #[tokio::main] async fn main() -> Result<(), contextor::ContextorError> {
//! let pipeline = RagPipeline::from_env()?;
//! let res = pipeline
//!     .query("What does the borrow checker enforce?", "rust-101", QueryOptions::default())
//!     .await?;
//! println!("{} (confidence {})", res.answer, res.confidence);
//! # Ok(()) }
//! ```

mod api_types;
mod budget;
mod cfg;
mod confidence;
mod error;
mod pipeline;
pub mod prompt;
mod synthesize;

pub use api_types::{IndexRequest, QueryOptions, RagResult};
pub use budget::{PASSAGE_DELIMITER, build_context};
pub use cfg::QueryDefaults;
pub use confidence::{HEDGING_PHRASES, score_confidence};
pub use error::ContextorError;
pub use pipeline::{NO_CONTEXT_ANSWER, RagPipeline};
pub use synthesize::{AnswerSynthesizer, ChatModel, Synthesis};
