//! Speaker label remapping.
//!
//! Transcript text is one `<label>: <utterance>` line per utterance. Renames
//! replace the label only in line-start position, so an utterance that
//! happens to mention a label token is never rewritten mid-sentence.

use std::collections::HashMap;

use crate::models::Utterance;

/// Mapping from provider speaker labels to user-chosen display names.
#[derive(Debug, Clone, Default)]
pub struct SpeakerMap {
    names: HashMap<String, String>,
}

impl SpeakerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rename for a provider label.
    pub fn insert(&mut self, original_label: impl Into<String>, display_name: impl Into<String>) {
        self.names.insert(original_label.into(), display_name.into());
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Display name for a label, if one was registered.
    pub fn display_name(&self, original_label: &str) -> Option<&str> {
        self.names.get(original_label).map(String::as_str)
    }

    /// Rewrite the flat text representation.
    ///
    /// A line is renamed iff the text before its first colon exactly equals a
    /// registered label. Everything after the colon is left untouched, so
    /// `"A: hello A"` with A→Alice becomes `"Alice: hello A"`. Lines without a
    /// colon, and lines whose prefix is not a registered label (including
    /// already-renamed lines), pass through unchanged.
    pub fn apply_to_text(&self, text: &str) -> String {
        if self.names.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                out.push('\n');
            }
            match line.split_once(':') {
                Some((label, rest)) => match self.names.get(label) {
                    Some(display) => {
                        out.push_str(display);
                        out.push(':');
                        out.push_str(rest);
                    }
                    None => out.push_str(line),
                },
                None => out.push_str(line),
            }
        }
        out
    }

    /// Rewrite the structured utterance list.
    ///
    /// The speaker field is already isolated, so this is an exact whole-field
    /// match rather than a prefix match.
    pub fn apply_to_utterances(&self, utterances: &mut [Utterance]) {
        if self.names.is_empty() {
            return;
        }
        for utt in utterances {
            if let Some(display) = self.names.get(&utt.speaker) {
                utt.speaker = display.clone();
            }
        }
    }
}

impl FromIterator<(String, String)> for SpeakerMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> SpeakerMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_renames_line_start_label_only() {
        let m = map(&[("A", "Alice")]);
        assert_eq!(m.apply_to_text("A: hello A"), "Alice: hello A");
    }

    #[test]
    fn test_in_text_mention_preserved() {
        let m = map(&[("L", "D")]);
        assert_eq!(m.apply_to_text("L: hello L"), "D: hello L");
    }

    #[test]
    fn test_reapplying_is_noop_on_renamed_text() {
        let m = map(&[("L", "D")]);
        let once = m.apply_to_text("L: hello");
        assert_eq!(once, "D: hello");
        // D is not a registered original label, so nothing double-prefixes.
        assert_eq!(m.apply_to_text(&once), "D: hello");
    }

    #[test]
    fn test_multiline_mixed_speakers() {
        let m = map(&[("A", "Alice"), ("B", "Bob")]);
        let text = "A: Hello\nB: Hi there\nA: How are you B";
        assert_eq!(
            m.apply_to_text(text),
            "Alice: Hello\nBob: Hi there\nAlice: How are you B"
        );
    }

    #[test]
    fn test_unmapped_label_untouched() {
        let m = map(&[("A", "Alice")]);
        assert_eq!(m.apply_to_text("C: Hello"), "C: Hello");
    }

    #[test]
    fn test_line_without_colon_untouched() {
        let m = map(&[("A", "Alice")]);
        assert_eq!(m.apply_to_text("no speaker here"), "no speaker here");
    }

    #[test]
    fn test_partial_prefix_not_renamed() {
        // "AB" starts with "A" but is a different label.
        let m = map(&[("A", "Alice")]);
        assert_eq!(m.apply_to_text("AB: Hello"), "AB: Hello");
    }

    #[test]
    fn test_multiword_label() {
        let m = map(&[("Speaker A", "Alice")]);
        assert_eq!(m.apply_to_text("Speaker A: Hello"), "Alice: Hello");
    }

    #[test]
    fn test_empty_map_is_identity() {
        let m = SpeakerMap::new();
        assert_eq!(m.apply_to_text("A: Hello"), "A: Hello");
    }

    #[test]
    fn test_trailing_newline_preserved() {
        let m = map(&[("A", "Alice")]);
        assert_eq!(m.apply_to_text("A: Hello\n"), "Alice: Hello\n");
    }

    #[test]
    fn test_utterances_exact_field_match() {
        let m = map(&[("A", "Alice")]);
        let mut utts = vec![
            Utterance {
                speaker: "A".into(),
                text: "Hi A".into(),
                start: 0,
                end: 1000,
            },
            Utterance {
                speaker: "AB".into(),
                text: "Hello".into(),
                start: 1000,
                end: 2000,
            },
        ];
        m.apply_to_utterances(&mut utts);
        assert_eq!(utts[0].speaker, "Alice");
        assert_eq!(utts[0].text, "Hi A");
        assert_eq!(utts[1].speaker, "AB");
    }

    #[test]
    fn test_display_name_lookup() {
        let m = map(&[("A", "Alice")]);
        assert_eq!(m.display_name("A"), Some("Alice"));
        assert_eq!(m.display_name("B"), None);
    }
}
