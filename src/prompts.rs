/// Fixed extraction instructions sent ahead of every document. Treated as a
/// configuration constant; never re-derived per document.
pub const SUMMARY_INSTRUCTIONS: &str = "Extract and revise the information from the provided document into a single paragraph that includes the function name, a description of its purpose, each parameters from params with their descriptions, an exhaustive listing of the related functions, and the associated tags and categories. GTS stands for Geo Time Series. You can extrapolate on categories. Do not extract 'since' and 'deprecated'.";

/// Assembles the single user message for one summarisation attempt.
pub fn user_message(content: &str) -> String {
    format!("{SUMMARY_INSTRUCTIONS}\n\nDocument:\n{content}")
}
