//! Ordered batch embedding.

use futures::future::try_join_all;
use tracing::debug;

use crate::{errors::EmbedError, provider::EmbeddingsProvider};

/// How [`run_batches`] slices and drives its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub batch_size: usize,
    /// Issue a whole chunk concurrently instead of one call at a time.
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 20,
            parallel: true,
        }
    }
}

/// Embeds `texts` chunk by chunk, keeping input order in the output.
///
/// After each chunk, `on_progress` receives `round(100 * done / total)`
/// where `done` and `total` count chunks. A parallel chunk is awaited in full
/// before the next one starts, so at most `batch_size` calls are in flight.
///
/// # Errors
/// - [`EmbedError::InvalidConfig`] when `batch_size` is zero
/// - the first embedding error encountered
pub async fn run_batches<E, S, P>(
    provider: &E,
    texts: &[S],
    opts: BatchOptions,
    mut on_progress: P,
) -> Result<Vec<Vec<f32>>, EmbedError>
where
    E: EmbeddingsProvider + ?Sized,
    S: AsRef<str> + Sync,
    P: FnMut(u32),
{
    if opts.batch_size == 0 {
        return Err(EmbedError::InvalidConfig("batch_size must be at least 1".into()));
    }

    let total = texts.len().div_ceil(opts.batch_size);
    let mut out = Vec::with_capacity(texts.len());

    for (i, chunk) in texts.chunks(opts.batch_size).enumerate() {
        if opts.parallel {
            let vecs = try_join_all(chunk.iter().map(|t| provider.embed(t.as_ref()))).await?;
            out.extend(vecs);
        } else {
            for t in chunk {
                out.push(provider.embed(t.as_ref()).await?);
            }
        }

        let done = i + 1;
        let pct = (100.0 * done as f64 / total as f64).round() as u32;
        debug!(chunk = done, total, pct, "embedding batch done");
        on_progress(pct);
    }

    Ok(out)
}
