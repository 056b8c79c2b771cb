use crate::error_handler::ConfigError;

/// Backend used for generative and embedding calls.
///
/// Only the OpenAI-compatible REST dialect is wired. Any other `LLM_KIND`
/// value is rejected at config time with [`ConfigError::UnsupportedProvider`]
/// instead of failing later inside a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// OpenAI API or any server speaking the same `/v1/*` protocol.
    OpenAI,
}

impl LlmProvider {
    /// Parses a provider kind (case-insensitive).
    ///
    /// # Errors
    /// [`ConfigError::UnsupportedProvider`] for anything but `openai`.
    pub fn from_kind(kind: &str) -> Result<Self, ConfigError> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kind_case_insensitively() {
        assert_eq!(LlmProvider::from_kind(" OpenAI ").unwrap(), LlmProvider::OpenAI);
        assert_eq!(LlmProvider::from_kind("chatgpt").unwrap(), LlmProvider::OpenAI);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = LlmProvider::from_kind("anthropic").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedProvider(ref k) if k == "anthropic"));
    }
}
