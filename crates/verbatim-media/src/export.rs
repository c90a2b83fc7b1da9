//! Transcript export writers.
//!
//! JSON output mirrors the provider's raw response. TXT output is one line
//! per utterance, `<speaker> ▶ <text>`.

use std::path::Path;

use tracing::debug;

use verbatim_core::defaults::TXT_SEPARATOR;
use verbatim_core::{Result, Utterance};

/// Render the TXT export body.
pub fn render_txt(utterances: &[Utterance]) -> String {
    let mut out = String::new();
    for utt in utterances {
        out.push_str(&utt.speaker);
        out.push(' ');
        out.push_str(TXT_SEPARATOR);
        out.push(' ');
        out.push_str(&utt.text);
        out.push('\n');
    }
    out
}

/// Write the raw provider response as pretty-printed JSON.
pub async fn write_transcript_json(raw: &serde_json::Value, output_path: &Path) -> Result<()> {
    let body = serde_json::to_string_pretty(raw)?;
    tokio::fs::write(output_path, body).await?;
    debug!(
        subsystem = "media",
        component = "export",
        path = %output_path.display(),
        "Wrote JSON export"
    );
    Ok(())
}

/// Write the utterance list as speaker-labeled text lines.
pub async fn write_transcript_txt(utterances: &[Utterance], output_path: &Path) -> Result<()> {
    tokio::fs::write(output_path, render_txt(utterances)).await?;
    debug!(
        subsystem = "media",
        component = "export",
        path = %output_path.display(),
        "Wrote TXT export"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utterance(speaker: &str, text: &str) -> Utterance {
        Utterance {
            speaker: speaker.to_string(),
            text: text.to_string(),
            start: 0,
            end: 1000,
        }
    }

    #[test]
    fn test_render_txt_single_utterance() {
        let lines = render_txt(&[utterance("A", "Hi")]);
        assert_eq!(lines, "A ▶ Hi\n");
        assert_eq!(lines.lines().count(), 1);
    }

    #[test]
    fn test_render_txt_preserves_order() {
        let lines = render_txt(&[utterance("A", "Hello"), utterance("B", "Hi there")]);
        assert_eq!(lines, "A ▶ Hello\nB ▶ Hi there\n");
    }

    #[test]
    fn test_render_txt_empty() {
        assert_eq!(render_txt(&[]), "");
    }

    #[tokio::test]
    async fn test_write_exports_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("t.json");
        let txt_path = dir.path().join("t.txt");

        let raw = serde_json::json!({
            "id": "job-1",
            "status": "completed",
            "utterances": [{"speaker": "A", "text": "Hi", "start": 0, "end": 500}]
        });
        write_transcript_json(&raw, &json_path).await.unwrap();
        write_transcript_txt(&[utterance("A", "Hi")], &txt_path)
            .await
            .unwrap();

        let json_back: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json_back, raw);

        let txt_back = std::fs::read_to_string(&txt_path).unwrap();
        assert_eq!(txt_back, "A ▶ Hi\n");
    }
}
