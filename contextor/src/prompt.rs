//! Prompt builder: fixed system message + context/question user message.

/// System instructions for grounded answers.
pub const SYSTEM_PROMPT: &str = "\
You are a course assistant. Answer the question using only the provided context. \
If the context does not contain enough information to answer, say so plainly instead of guessing. \
At the end of your answer, cite which parts of the context you used.";

/// User message carrying the bounded context and the question.
///
/// # Example
/// ```
/// # use contextor::prompt::build_user_prompt;
/// let prompt = build_user_prompt("What is a trait?", "Traits define shared behavior.");
/// assert!(prompt.starts_with("Context:\n"));
/// assert!(prompt.ends_with("Question: What is a trait?"));
/// ```
pub fn build_user_prompt(question: &str, context: &str) -> String {
    format!("Context:\n{}\n\nQuestion: {}", context.trim(), question.trim())
}
