/// Placeholder replaced by the post text
pub const TWEET_PLACEHOLDER: &str = "{tweet}";

/// Placeholder replaced by the user's filtering instructions
pub const INSTRUCTIONS_PLACEHOLDER: &str = "{prompt_instructions}";

/// Fill a prompt template with the post text and the instructions.
///
/// Only the first occurrence of each placeholder in `template` is replaced.
/// Placeholders are located in the template before substituting, so
/// placeholder tokens appearing inside `text` or `instructions` are copied
/// through verbatim.
pub fn build_prompt(template: &str, instructions: &str, text: &str) -> String {
    let mut spans: Vec<(usize, &str, &str)> = Vec::with_capacity(2);
    if let Some(at) = template.find(TWEET_PLACEHOLDER) {
        spans.push((at, TWEET_PLACEHOLDER, text));
    }
    if let Some(at) = template.find(INSTRUCTIONS_PLACEHOLDER) {
        spans.push((at, INSTRUCTIONS_PLACEHOLDER, instructions));
    }
    spans.sort_by_key(|(at, _, _)| *at);

    let mut prompt = String::with_capacity(template.len() + text.len() + instructions.len());
    let mut cursor = 0;
    for (at, placeholder, replacement) in spans {
        prompt.push_str(&template[cursor..at]);
        prompt.push_str(replacement);
        cursor = at + placeholder.len();
    }
    prompt.push_str(&template[cursor..]);
    prompt
}
