//! System-prompt construction for transcript chat.

use crate::defaults::{DEFAULT_SYSTEM_PROMPT, TRANSCRIPT_PLACEHOLDER};

/// Build the system instruction for a chat exchange.
///
/// With a custom template, the `{transcript}` placeholder is substituted when
/// present; otherwise the transcript is appended after the template under a
/// `[TRANSCRIPT]:` marker. Without a template the fixed default instruction
/// is used.
pub fn build_system_prompt(template: Option<&str>, transcript_text: &str) -> String {
    match template {
        Some(template) if template.contains(TRANSCRIPT_PLACEHOLDER) => {
            template.replace(TRANSCRIPT_PLACEHOLDER, transcript_text)
        }
        Some(template) => format!("{template}\n\n[TRANSCRIPT]:\n{transcript_text}"),
        None => DEFAULT_SYSTEM_PROMPT.replace(TRANSCRIPT_PLACEHOLDER, transcript_text),
    }
}
