//! Thinking pre-pass: prompt construction and text extraction.

/// Phrase the model is asked to open its reasoning with.
pub const THINKING_SENTINEL: &str = "Thinking:";

/// Phrases that end the reasoning part of a reply.
pub const TERMINATING_CUES: [&str; 3] = ["In conclusion", "Therefore", "Final answer"];

/// Prompt for the preliminary reasoning exchange.
pub fn thinking_prompt(user_input: &str) -> String {
    format!(
        "Before answering, reason step by step about the request below. \
         Start your reply with \"{THINKING_SENTINEL}\" and write only the reasoning, \
         not the final answer.\n\nRequest:\n{user_input}"
    )
}

/// Pull the reasoning out of a thinking reply.
///
/// Text starts after the sentinel (or at the beginning when the model left
/// it out) and stops at the first terminating cue. Matching is
/// ASCII-case-insensitive. Returns `None` when nothing is left.
pub fn extract_thinking(raw: &str) -> Option<String> {
    // ASCII lowering keeps byte offsets valid for slicing `raw`.
    let lowered = raw.to_ascii_lowercase();

    let start = lowered
        .find(&THINKING_SENTINEL.to_ascii_lowercase())
        .map(|pos| pos + THINKING_SENTINEL.len())
        .unwrap_or(0);

    let end = TERMINATING_CUES
        .iter()
        .filter_map(|cue| lowered[start..].find(&cue.to_ascii_lowercase()))
        .min()
        .map(|pos| start + pos)
        .unwrap_or(raw.len());

    let thinking = raw[start..end].trim();
    if thinking.is_empty() {
        None
    } else {
        Some(thinking.to_string())
    }
}
