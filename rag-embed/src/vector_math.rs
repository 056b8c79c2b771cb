//! Pure numeric helpers over embeddings.
//!
//! Every binary operation rejects vectors of different length with
//! [`DimensionMismatch`]; nothing is truncated or padded.

use crate::errors::DimensionMismatch;

fn check_len(a: &[f32], b: &[f32]) -> Result<(), DimensionMismatch> {
    if a.len() == b.len() {
        Ok(())
    } else {
        Err(DimensionMismatch {
            left: a.len(),
            right: b.len(),
        })
    }
}

/// Sum of element-wise products.
pub fn dot(a: &[f32], b: &[f32]) -> Result<f32, DimensionMismatch> {
    check_len(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Euclidean norm.
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine of the angle between `a` and `b`.
///
/// Returns `0.0` when either vector has zero magnitude (including the empty
/// vector), so callers never see `NaN`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, DimensionMismatch> {
    let d = dot(a, b)?;
    let denom = magnitude(a) * magnitude(b);
    if denom == 0.0 {
        return Ok(0.0);
    }
    Ok(d / denom)
}

/// Square root of the summed squared differences.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Result<f32, DimensionMismatch> {
    check_len(a, b)?;
    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt())
}
