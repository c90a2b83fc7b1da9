//! Unauthenticated guest transcription.
//!
//! Same pipeline as the authenticated path, with a hard upload ceiling and
//! nothing persisted: output files are removed once the response is built.

use axum::extract::{Multipart, State};
use axum::Json;
use tracing::info;
use uuid::Uuid;

use verbatim_media::remove_quietly;

use crate::error::ApiError;
use crate::handlers::transcripts::read_upload;
use crate::state::AppState;

/// POST /guest/transcribe
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pipeline = state.require_pipeline()?.clone();
    let upload = read_upload(multipart).await?;

    let limit = state.config.guest_max_upload_bytes;
    if upload.data.len() > limit {
        return Err(ApiError::BadRequest(format!(
            "Guest uploads are limited to {} MB",
            limit / (1024 * 1024)
        )));
    }

    tokio::fs::create_dir_all(&state.config.input_dir)
        .await
        .map_err(verbatim_core::Error::Io)?;

    let uid = Uuid::new_v4().simple().to_string();
    let base_name = format!("guest_{}", &uid[..8]);
    let input_path = state
        .config
        .input_dir
        .join(format!("{base_name}_{}", upload.filename));

    tokio::fs::write(&input_path, &upload.data)
        .await
        .map_err(verbatim_core::Error::Io)?;

    let run = pipeline.run(&input_path, &base_name, upload.quality).await;
    remove_quietly(&input_path).await;
    let output = run?;

    let body = serde_json::json!({
        "provider_id": &output.result.id,
        "text": &output.result.text,
        "utterances": &output.result.utterances,
    });

    // Guest runs leave nothing on disk.
    pipeline.discard_outputs(&output).await;

    info!(
        subsystem = "api",
        component = "guest",
        op = "transcribe",
        provider_id = %output.result.id,
        "Guest transcription served"
    );

    Ok(Json(body))
}
