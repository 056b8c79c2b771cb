//! Answer synthesis over a generative model.

use std::sync::Arc;

use ai_llm_service::{AiLlmError, ChatCompletion, OpenAiService};
use futures::future::BoxFuture;
use tracing::debug;

use crate::{
    error::ContextorError,
    prompt::{SYSTEM_PROMPT, build_user_prompt},
};

/// Generative model seam.
pub trait ChatModel: Send + Sync {
    /// `model` overrides the configured model for this call.
    fn chat<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
        model: Option<&'a str>,
    ) -> BoxFuture<'a, Result<ChatCompletion, AiLlmError>>;
}

impl ChatModel for OpenAiService {
    fn chat<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
        model: Option<&'a str>,
    ) -> BoxFuture<'a, Result<ChatCompletion, AiLlmError>> {
        Box::pin(OpenAiService::chat(self, system, user, model))
    }
}

/// Raw answer and the tokens the model reported for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Synthesis {
    pub answer: String,
    pub tokens_used: u32,
}

#[derive(Clone)]
pub struct AnswerSynthesizer {
    chat: Arc<dyn ChatModel>,
}

impl AnswerSynthesizer {
    pub fn new(chat: Arc<dyn ChatModel>) -> Self {
        Self { chat }
    }

    pub async fn synthesize(
        &self,
        question: &str,
        context: &str,
        model: Option<&str>,
    ) -> Result<Synthesis, ContextorError> {
        let user = build_user_prompt(question, context);
        let out = self.chat.chat(SYSTEM_PROMPT, &user, model).await?;
        debug!(
            answer_len = out.content.len(),
            tokens = out.usage.total_tokens,
            "answer synthesized"
        );
        Ok(Synthesis {
            answer: out.content.trim().to_string(),
            tokens_used: out.usage.total_tokens,
        })
    }
}
