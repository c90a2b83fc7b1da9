//! Full-account data export as a gzip tar archive.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::transcripts::parse_utterances;
use crate::state::AppState;

fn append_file(
    builder: &mut tar::Builder<GzEncoder<Vec<u8>>>,
    path: &str,
    data: &[u8],
) -> std::io::Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(Utc::now().timestamp() as u64);
    header.set_cksum();
    builder.append_data(&mut header, path, data)
}

/// GET /export — every transcript (txt with speaker names applied + raw
/// json) plus a metadata manifest.
pub async fn export(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<axum::response::Response, ApiError> {
    let transcripts = state.db.transcripts.list_full(user.id).await?;

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let mut manifest_entries = Vec::with_capacity(transcripts.len());

    for transcript in &transcripts {
        let speaker_map = state.db.speakers.map(transcript.id).await?;

        let text = speaker_map.apply_to_text(&transcript.text_content);
        append_file(
            &mut builder,
            &format!("transcripts/{}/transcript.txt", transcript.id),
            text.as_bytes(),
        )?;

        if let Some(raw) = &transcript.json_content {
            let mut body = raw.clone();
            let mut utterances = parse_utterances(Some(&body));
            speaker_map.apply_to_utterances(&mut utterances);
            body["utterances"] =
                serde_json::to_value(&utterances).map_err(verbatim_core::Error::from)?;
            let json = serde_json::to_string_pretty(&body).map_err(verbatim_core::Error::from)?;
            append_file(
                &mut builder,
                &format!("transcripts/{}/transcript.json", transcript.id),
                json.as_bytes(),
            )?;
        }

        manifest_entries.push(serde_json::json!({
            "id": transcript.id,
            "provider_id": transcript.provider_id,
            "filename": transcript.filename,
            "created_at": transcript.created_at,
        }));
    }

    let manifest = serde_json::json!({
        "exported_at": Utc::now(),
        "username": user.username,
        "transcript_count": transcripts.len(),
        "transcripts": manifest_entries,
    });
    let manifest_json =
        serde_json::to_string_pretty(&manifest).map_err(verbatim_core::Error::from)?;
    append_file(&mut builder, "metadata.json", manifest_json.as_bytes())?;

    let encoder = builder.into_inner()?;
    let bytes = encoder.finish()?;

    info!(
        subsystem = "api",
        component = "export",
        op = "export",
        transcript_count = transcripts.len(),
        archive_bytes = bytes.len(),
        "Account export built"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/gzip"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"verbatim-export.tar.gz\"",
            ),
        ],
        bytes,
    )
        .into_response())
}
