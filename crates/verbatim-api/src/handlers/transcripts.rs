//! Transcription upload and transcript CRUD handlers.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use verbatim_core::{sanitize_filename, Quality, RenameTranscript, SpeakerUpdate, Utterance};
use verbatim_media::remove_quietly;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub format: Option<String>,
}

/// An uploaded audio file plus its form fields.
pub struct UploadedAudio {
    pub filename: String,
    pub data: Vec<u8>,
    pub quality: Quality,
}

/// Pull the audio file and quality tier out of a multipart form.
pub async fn read_upload(mut multipart: Multipart) -> Result<UploadedAudio, ApiError> {
    let mut filename: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;
    let mut quality = Quality::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("file") => {
                filename = Some(sanitize_filename(field.file_name().unwrap_or("upload")));
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Read error: {e}")))?
                        .to_vec(),
                );
            }
            Some("quality") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Read error: {e}")))?;
                quality = value.parse::<Quality>()?;
            }
            _ => {} // ignore unknown fields
        }
    }

    let data = data.ok_or_else(|| {
        ApiError::BadRequest("Missing file in multipart form".to_string())
    })?;
    if data.is_empty() {
        return Err(ApiError::BadRequest("Audio file is empty".to_string()));
    }

    Ok(UploadedAudio {
        filename: filename.unwrap_or_else(|| "upload".to_string()),
        data,
        quality,
    })
}

/// Parse the provider's utterance array out of stored raw JSON, leniently.
pub fn parse_utterances(json_content: Option<&serde_json::Value>) -> Vec<Utterance> {
    json_content
        .and_then(|v| v.get("utterances"))
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

/// POST /transcribe
pub async fn transcribe(
    State(state): State<AppState>,
    crate::auth::CurrentUser(user): crate::auth::CurrentUser,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pipeline = state.require_pipeline()?.clone();
    let upload = read_upload(multipart).await?;

    tokio::fs::create_dir_all(&state.config.input_dir)
        .await
        .map_err(verbatim_core::Error::Io)?;

    let uid = Uuid::new_v4().simple().to_string();
    let stored_name = format!("{}_{}", &uid[..8], upload.filename);
    let input_path = state.config.input_dir.join(&stored_name);
    let base_name = std::path::Path::new(&stored_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or(stored_name.clone());

    tokio::fs::write(&input_path, &upload.data)
        .await
        .map_err(verbatim_core::Error::Io)?;

    let run = pipeline.run(&input_path, &base_name, upload.quality).await;

    // Stored uploads are scratch space either way.
    remove_quietly(&input_path).await;

    let output = run?;

    let transcript = state
        .db
        .transcripts
        .insert(
            user.id,
            &output.result.id,
            &upload.filename,
            &output.result.text,
            Some(&output.result.raw),
        )
        .await?;

    info!(
        subsystem = "api",
        component = "transcripts",
        op = "transcribe",
        transcript_id = %transcript.id,
        provider_id = %output.result.id,
        "Transcript persisted"
    );

    Ok(Json(serde_json::json!({
        "id": transcript.id,
        "provider_id": transcript.provider_id,
        "filename": transcript.filename,
        "text_file": format!("/transcripts/{}?format=txt", transcript.id),
        "json_file": format!("/transcripts/{}?format=json", transcript.id),
    })))
}

/// GET /transcripts/list
pub async fn list(
    State(state): State<AppState>,
    crate::auth::CurrentUser(user): crate::auth::CurrentUser,
) -> Result<Json<Vec<verbatim_core::TranscriptSummary>>, ApiError> {
    Ok(Json(state.db.transcripts.list(user.id).await?))
}

/// GET /transcripts/:id — download with speaker display names applied.
pub async fn download(
    State(state): State<AppState>,
    crate::auth::CurrentUser(user): crate::auth::CurrentUser,
    Path(id): Path<Uuid>,
    Query(query): Query<DownloadQuery>,
) -> Result<axum::response::Response, ApiError> {
    let transcript = state
        .db
        .transcripts
        .get_owned(id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transcript not found".to_string()))?;

    let speaker_map = state.db.speakers.map(id).await?;

    match query.format.as_deref() {
        Some("json") => {
            let mut body = transcript
                .json_content
                .clone()
                .unwrap_or_else(|| serde_json::json!({}));
            let mut utterances = parse_utterances(Some(&body));
            speaker_map.apply_to_utterances(&mut utterances);
            body["utterances"] = serde_json::to_value(&utterances)
                .map_err(verbatim_core::Error::from)?;
            Ok(Json(body).into_response())
        }
        _ => {
            let body = speaker_map.apply_to_text(&transcript.text_content);
            Ok((
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                body,
            )
                .into_response())
        }
    }
}

/// PATCH /transcripts/:id — rename.
pub async fn rename(
    State(state): State<AppState>,
    crate::auth::CurrentUser(user): crate::auth::CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameTranscript>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.filename.trim().is_empty() {
        return Err(ApiError::BadRequest("Filename must not be empty".to_string()));
    }

    let renamed = state
        .db
        .transcripts
        .rename(id, user.id, req.filename.trim())
        .await?;
    if !renamed {
        return Err(ApiError::NotFound("Transcript not found".to_string()));
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "filename": req.filename.trim(),
    })))
}

/// DELETE /transcripts/:id — cascades to chat messages and speaker mappings.
pub async fn delete(
    State(state): State<AppState>,
    crate::auth::CurrentUser(user): crate::auth::CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = state.db.transcripts.delete(id, user.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Transcript not found".to_string()));
    }
    Ok(Json(serde_json::json!({"message": "Transcript deleted"})))
}

/// GET /transcripts/:id/utterances — raw utterances plus the mapping table.
pub async fn utterances(
    State(state): State<AppState>,
    crate::auth::CurrentUser(user): crate::auth::CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let transcript = state
        .db
        .transcripts
        .get_owned(id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transcript not found".to_string()))?;

    let utterances = transcript
        .json_content
        .as_ref()
        .and_then(|v| v.get("utterances"))
        .cloned()
        .unwrap_or_else(|| serde_json::json!([]));

    let speakers: serde_json::Map<String, serde_json::Value> = state
        .db
        .speakers
        .list(id)
        .await?
        .into_iter()
        .map(|m| (m.original_label, serde_json::Value::String(m.display_name)))
        .collect();

    Ok(Json(serde_json::json!({
        "utterances": utterances,
        "speakers": speakers,
    })))
}

/// PUT /transcripts/:id/speakers — upsert one display-name mapping.
pub async fn update_speaker(
    State(state): State<AppState>,
    crate::auth::CurrentUser(user): crate::auth::CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SpeakerUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.original_label.trim().is_empty() || req.display_name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "original_label and display_name are required".to_string(),
        ));
    }

    // Ownership check before touching the mapping table.
    state
        .db
        .transcripts
        .get_owned(id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transcript not found".to_string()))?;

    let mapping = state
        .db
        .speakers
        .upsert(id, req.original_label.trim(), req.display_name.trim())
        .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "display_name": mapping.display_name,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_utterances_lenient() {
        let raw = serde_json::json!({
            "utterances": [
                {"speaker": "A", "text": "Hi", "start": 10, "end": 20},
                {"speaker": "B", "text": "Hello"}
            ]
        });
        let utts = parse_utterances(Some(&raw));
        assert_eq!(utts.len(), 2);
        assert_eq!(utts[1].speaker, "B");
        assert_eq!(utts[1].start, 0);
    }

    #[test]
    fn test_parse_utterances_missing_key() {
        assert!(parse_utterances(Some(&serde_json::json!({}))).is_empty());
        assert!(parse_utterances(None).is_empty());
    }

    #[test]
    fn test_parse_utterances_non_array() {
        let raw = serde_json::json!({"utterances": "oops"});
        assert!(parse_utterances(Some(&raw)).is_empty());
    }
}
