//! The convert → transcribe → export pipeline shared by the API and CLI.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use verbatim_core::{Quality, Result};
use verbatim_inference::transcription::{TranscriptionBackend, TranscriptionResult};

use crate::convert::AudioConverter;
use crate::export::{write_transcript_json, write_transcript_txt};

/// Everything a completed pipeline run produced.
#[derive(Debug)]
pub struct PipelineOutput {
    pub mp3_path: PathBuf,
    pub json_path: PathBuf,
    pub txt_path: PathBuf,
    pub result: TranscriptionResult,
}

/// Sequential transcription workflow around the converter and provider client.
pub struct TranscriptionPipeline {
    converter: AudioConverter,
    backend: Arc<dyn TranscriptionBackend>,
    output_dir: PathBuf,
}

impl TranscriptionPipeline {
    pub fn new(
        converter: AudioConverter,
        backend: Arc<dyn TranscriptionBackend>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            converter,
            backend,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run the full workflow for a stored upload.
    ///
    /// `base_name` keys the output files: `<base_name>.mp3`, `.json`, `.txt`
    /// land in the output directory. Partial outputs from a failed run are
    /// removed opportunistically; the stored input is the caller's to clean.
    pub async fn run(
        &self,
        input: &Path,
        base_name: &str,
        quality: Quality,
    ) -> Result<PipelineOutput> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let mp3_path = self.output_dir.join(format!("{base_name}.mp3"));
        let json_path = self.output_dir.join(format!("{base_name}.json"));
        let txt_path = self.output_dir.join(format!("{base_name}.txt"));

        self.converter.convert_to_mp3(input, &mp3_path, quality).await?;

        self.run_from_mp3(mp3_path, json_path, txt_path, base_name)
            .await
    }

    async fn run_from_mp3(
        &self,
        mp3_path: PathBuf,
        json_path: PathBuf,
        txt_path: PathBuf,
        base_name: &str,
    ) -> Result<PipelineOutput> {
        let audio = tokio::fs::read(&mp3_path).await?;

        let result = match self.backend.transcribe(&audio, None).await {
            Ok(result) => result,
            Err(e) => {
                // Conversion succeeded but transcription failed: drop the
                // orphaned mp3 so the output dir does not accumulate them.
                remove_quietly(&mp3_path).await;
                return Err(e);
            }
        };

        write_transcript_json(&result.raw, &json_path).await?;
        write_transcript_txt(&result.utterances, &txt_path).await?;

        info!(
            subsystem = "media",
            component = "pipeline",
            op = "run",
            base_name,
            job_id = %result.id,
            utterance_count = result.utterances.len(),
            "Pipeline complete"
        );

        Ok(PipelineOutput {
            mp3_path,
            json_path,
            txt_path,
            result,
        })
    }

    /// Remove every output file of a run (guest mode keeps nothing).
    pub async fn discard_outputs(&self, output: &PipelineOutput) {
        remove_quietly(&output.mp3_path).await;
        remove_quietly(&output.json_path).await;
        remove_quietly(&output.txt_path).await;
    }
}

/// Best-effort removal; failures are logged, never propagated.
pub async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(
                subsystem = "media",
                component = "pipeline",
                path = %path.display(),
                error = %e,
                "Failed to remove file"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use verbatim_core::{Error, Utterance};

    /// Copies input to output, standing in for ffmpeg in tests.
    fn fake_converter() -> AudioConverter {
        AudioConverter::new(crate::convert::ConverterConfig {
            ffmpeg_bin: "cp-shim".to_string(),
            timeout_secs: 5,
        })
    }

    struct StaticBackend {
        result: Option<TranscriptionResult>,
    }

    #[async_trait]
    impl TranscriptionBackend for StaticBackend {
        async fn transcribe(
            &self,
            _audio: &[u8],
            _language: Option<&str>,
        ) -> Result<TranscriptionResult> {
            match &self.result {
                Some(r) => Ok(r.clone()),
                None => Err(Error::Transcription("provider rejected audio".to_string())),
            }
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn provider_name(&self) -> &str {
            "static"
        }
    }

    fn canned_result() -> TranscriptionResult {
        TranscriptionResult {
            id: "job-1".to_string(),
            text: "A: Hi".to_string(),
            utterances: vec![Utterance {
                speaker: "A".to_string(),
                text: "Hi".to_string(),
                start: 0,
                end: 500,
            }],
            raw: serde_json::json!({"id": "job-1", "status": "completed"}),
        }
    }

    #[tokio::test]
    async fn test_exports_written_from_mp3() {
        let dir = tempfile::tempdir().unwrap();
        let mp3 = dir.path().join("rec.mp3");
        tokio::fs::write(&mp3, b"mp3-bytes").await.unwrap();

        let pipeline = TranscriptionPipeline::new(
            fake_converter(),
            Arc::new(StaticBackend {
                result: Some(canned_result()),
            }),
            dir.path(),
        );

        let output = pipeline
            .run_from_mp3(
                mp3,
                dir.path().join("rec.json"),
                dir.path().join("rec.txt"),
                "rec",
            )
            .await
            .unwrap();

        assert_eq!(output.result.id, "job-1");
        let txt = std::fs::read_to_string(&output.txt_path).unwrap();
        assert_eq!(txt, "A ▶ Hi\n");
        assert!(output.json_path.exists());
    }

    #[tokio::test]
    async fn test_failed_transcription_removes_orphaned_mp3() {
        let dir = tempfile::tempdir().unwrap();
        let mp3 = dir.path().join("rec.mp3");
        tokio::fs::write(&mp3, b"mp3-bytes").await.unwrap();

        let pipeline = TranscriptionPipeline::new(
            fake_converter(),
            Arc::new(StaticBackend { result: None }),
            dir.path(),
        );

        let err = pipeline
            .run_from_mp3(
                mp3.clone(),
                dir.path().join("rec.json"),
                dir.path().join("rec.txt"),
                "rec",
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transcription(_)));
        assert!(!mp3.exists());
        assert!(!dir.path().join("rec.json").exists());
    }

    #[tokio::test]
    async fn test_discard_outputs_removes_all() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["g.mp3", "g.json", "g.txt"] {
            tokio::fs::write(dir.path().join(name), b"x").await.unwrap();
        }

        let pipeline = TranscriptionPipeline::new(
            fake_converter(),
            Arc::new(StaticBackend {
                result: Some(canned_result()),
            }),
            dir.path(),
        );
        let output = PipelineOutput {
            mp3_path: dir.path().join("g.mp3"),
            json_path: dir.path().join("g.json"),
            txt_path: dir.path().join("g.txt"),
            result: canned_result(),
        };

        pipeline.discard_outputs(&output).await;
        assert!(!dir.path().join("g.mp3").exists());
        assert!(!dir.path().join("g.json").exists());
        assert!(!dir.path().join("g.txt").exists());
    }

    #[tokio::test]
    async fn test_remove_quietly_tolerates_missing_file() {
        remove_quietly(Path::new("/nonexistent/path/file.mp3")).await;
    }
}
