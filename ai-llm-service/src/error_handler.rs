//! Unified error handling for `ai-llm-service`.
//!
//! A single top-level error type [`AiLlmError`] covers the whole library.
//! Domain-specific failures are grouped in nested enums ([`ConfigError`],
//! [`ProviderError`]). Small helpers for reading and validating environment
//! variables return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[AI LLM Service]` to simplify attribution in logs.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Upstream provider rejected or garbled a request.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Underlying HTTP transport error.
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Operation exceeded the configured timeout.
    #[error("[AI LLM Service] operation timed out after {0:?}")]
    Timeout(Duration),
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Errors raised while building configs from the environment.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[AI LLM Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse.
    #[error("[AI LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g. `LLM_MAX_TOKENS`).
        var: &'static str,
        /// Human-readable reason (e.g. `expected u32`).
        reason: &'static str,
    },

    /// Unsupported provider in `LLM_KIND`.
    #[error("[AI LLM Service] unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Value had the wrong format (e.g. invalid URL).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g. `OPENAI_BASE_URL`).
        var: &'static str,
        /// Explanation.
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g. `temperature`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Which upstream produced a [`ProviderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
}

/// Upstream failure tagged with its provider.
#[derive(Debug, Error)]
#[error("[AI LLM Service] {provider:?}: {kind}")]
pub struct ProviderError {
    pub provider: Provider,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: Provider, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }
}

/// Provider failure categories.
#[derive(Debug, Error)]
pub enum ProviderErrorKind {
    /// Config carries no API key.
    #[error("missing API key")]
    MissingApiKey,

    /// Endpoint is empty or not http/https.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Upstream returned a non-successful HTTP status.
    #[error("{0}")]
    HttpStatus(HttpError),

    /// Response payload could not be decoded as expected.
    #[error("decode error: {0}")]
    Decode(String),

    /// Chat completion contained no usable choice.
    #[error("completion returned no choices")]
    EmptyChoices,
}

/// Details of a non-2xx upstream response.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub url: String,
    /// Trimmed prefix of the response body.
    pub snippet: String,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} from {}: {}", self.status, self.url, self.snippet)
    }
}

/// Maximum number of characters kept from an upstream error body.
const SNIPPET_CHARS: usize = 240;

/// Collapses whitespace and keeps a short prefix of an upstream body.
pub fn make_snippet(body: &str) -> String {
    let compact = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.chars().count() <= SNIPPET_CHARS {
        return compact;
    }
    let mut out: String = compact.chars().take(SNIPPET_CHARS).collect();
    out.push('…');
    out
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Reads a variable, treating empty or whitespace-only values as unset.
pub fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Fetches a required, non-empty environment variable.
///
/// # Errors
/// [`ConfigError::MissingVar`] if the variable is absent or empty.
pub fn must_env(name: &'static str) -> Result<String> {
    env_non_empty(name).ok_or_else(|| ConfigError::MissingVar(name).into())
}

/// Parses an optional `u32` from env (`Ok(None)` if unset/empty).
pub fn env_opt_u32(name: &'static str) -> Result<Option<u32>> {
    parse_opt(name, env_non_empty(name).as_deref(), "expected u32")
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
pub fn env_opt_u64(name: &'static str) -> Result<Option<u64>> {
    parse_opt(name, env_non_empty(name).as_deref(), "expected u64")
}

/// Parses an optional `f32` from env (`Ok(None)` if unset/empty).
pub fn env_opt_f32(name: &'static str) -> Result<Option<f32>> {
    parse_opt(name, env_non_empty(name).as_deref(), "expected a float")
}

/// Parses an optional `bool` (`true/false/1/0/yes/no`) from env.
pub fn env_opt_bool(name: &'static str) -> Result<Option<bool>> {
    parse_opt_bool(name, env_non_empty(name).as_deref())
}

/// Parses `raw` as `T` when present.
///
/// # Errors
/// [`ConfigError::InvalidNumber`] naming `var` if parsing fails.
pub fn parse_opt<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<&str>,
    reason: &'static str,
) -> Result<Option<T>> {
    match raw {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, reason }.into()),
        None => Ok(None),
    }
}

/// Parses a lenient boolean when present.
pub fn parse_opt_bool(var: &'static str, raw: Option<&str>) -> Result<Option<bool>> {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(None),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidFormat {
                var,
                reason: "expected true/false",
            }
            .into()),
        },
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers                                                        */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a float lies within an inclusive range.
pub fn validate_range_f32(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            detail: "expected value in inclusive range",
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_opt_reports_the_variable_name() {
        let err = parse_opt::<u32>("LLM_MAX_TOKENS", Some("lots"), "expected u32").unwrap_err();
        assert!(err.to_string().contains("LLM_MAX_TOKENS"));
        assert_eq!(parse_opt::<u32>("X", Some(" 42 "), "n").unwrap(), Some(42));
        assert_eq!(parse_opt::<u32>("X", None, "n").unwrap(), None);
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_opt_bool("B", Some("YES")).unwrap(), Some(true));
        assert_eq!(parse_opt_bool("B", Some("0")).unwrap(), Some(false));
        assert!(parse_opt_bool("B", Some("maybe")).is_err());
    }

    #[test]
    fn snippet_is_compacted_and_bounded() {
        assert_eq!(make_snippet("  a \n\t b  "), "a b");
        let long = "x".repeat(1000);
        let s = make_snippet(&long);
        assert_eq!(s.chars().count(), SNIPPET_CHARS + 1);
        assert!(s.ends_with('…'));
    }

    #[test]
    fn range_validation() {
        assert!(validate_range_f32("temperature", 0.3, 0.0, 2.0).is_ok());
        assert!(validate_range_f32("temperature", f32::NAN, 0.0, 2.0).is_err());
        assert!(validate_range_f32("temperature", 2.5, 0.0, 2.0).is_err());
    }
}
