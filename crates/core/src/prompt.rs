use crate::models::RetrievedSource;

pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Refusal wording the model is told to use when the context does not hold
/// the answer. Prompt convention only; nothing verifies the model complies.
pub const FALLBACK_ANSWER: &str = "I don't know based on the provided course material.";

pub fn format_context(sources: &[RetrievedSource]) -> String {
    sources
        .iter()
        .map(|source| source.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful university course assistant.\n\
         \n\
         Answer the question using ONLY the context below.\n\
         If the answer is not present in the context, say:\n\
         \"{FALLBACK_ANSWER}\"\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Answer clearly and concisely."
    )
}
