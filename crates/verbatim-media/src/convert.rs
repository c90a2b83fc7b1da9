//! Audio conversion via ffmpeg.
//!
//! Every upload is normalized to mono 16 kHz MP3 at the caller-selected
//! bitrate tier before being sent to the transcription provider.

use std::path::Path;

use tokio::process::Command;
use tracing::{debug, info};

use verbatim_core::defaults::{FFMPEG_BIN, FFMPEG_TIMEOUT_SECS, SAMPLE_RATE_HZ};
use verbatim_core::{Error, Quality, Result};

/// Configuration for the converter.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// ffmpeg binary name or path.
    pub ffmpeg_bin: String,
    /// Wall-clock budget for one conversion.
    pub timeout_secs: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: FFMPEG_BIN.to_string(),
            timeout_secs: FFMPEG_TIMEOUT_SECS,
        }
    }
}

/// Transcodes uploaded audio to mono 16 kHz MP3.
#[derive(Debug, Clone)]
pub struct AudioConverter {
    config: ConverterConfig,
}

impl AudioConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Argument list for one conversion, `-y` overwriting stale outputs.
    fn build_args(input: &Path, output: &Path, quality: Quality) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-ac".to_string(),
            "1".to_string(),
            "-ar".to_string(),
            SAMPLE_RATE_HZ.to_string(),
            "-b:a".to_string(),
            quality.bitrate().to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }

    /// Convert a source file into a mono 16 kHz MP3 at the given tier.
    ///
    /// A non-zero ffmpeg exit is terminal for the request; its stderr is
    /// surfaced verbatim in the error.
    pub async fn convert_to_mp3(
        &self,
        input: &Path,
        output: &Path,
        quality: Quality,
    ) -> Result<()> {
        info!(
            subsystem = "media",
            component = "converter",
            op = "convert",
            input = %input.display(),
            output = %output.display(),
            bitrate = quality.bitrate(),
            "Converting audio"
        );

        let args = Self::build_args(input, output, quality);
        debug!(subsystem = "media", component = "converter", ?args, "ffmpeg invocation");

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(self.config.timeout_secs),
            Command::new(&self.config.ffmpeg_bin).args(&args).output(),
        )
        .await
        .map_err(|_| {
            Error::Conversion(format!(
                "ffmpeg timed out after {}s",
                self.config.timeout_secs
            ))
        })?
        .map_err(|e| Error::Conversion(format!("Failed to execute ffmpeg: {e}")))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::Conversion(stderr.trim().to_string()));
        }

        Ok(())
    }

    /// Check that ffmpeg is installed and runnable.
    pub async fn health_check(&self) -> Result<bool> {
        match Command::new(&self.config.ffmpeg_bin)
            .arg("-version")
            .output()
            .await
        {
            Ok(output) => Ok(output.status.success()),
            Err(_) => Ok(false),
        }
    }
}

impl Default for AudioConverter {
    fn default() -> Self {
        Self::new(ConverterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_build_args_shape() {
        let args = AudioConverter::build_args(
            &PathBuf::from("in.m4a"),
            &PathBuf::from("out.mp3"),
            Quality::Medium,
        );
        assert_eq!(
            args,
            vec!["-y", "-i", "in.m4a", "-ac", "1", "-ar", "16000", "-b:a", "96k", "out.mp3"]
        );
    }

    #[test]
    fn test_build_args_bitrate_follows_quality() {
        let args = AudioConverter::build_args(
            &PathBuf::from("a"),
            &PathBuf::from("b"),
            Quality::Low,
        );
        assert!(args.contains(&"64k".to_string()));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_conversion_error() {
        // `false` exits 1 with no output; any diagnostic would pass through.
        let converter = AudioConverter::new(ConverterConfig {
            ffmpeg_bin: "false".to_string(),
            timeout_secs: 5,
        });
        let err = converter
            .convert_to_mp3(
                &PathBuf::from("in.m4a"),
                &PathBuf::from("out.mp3"),
                Quality::High,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_conversion_error() {
        let converter = AudioConverter::new(ConverterConfig {
            ffmpeg_bin: "definitely-not-a-real-binary-name".to_string(),
            timeout_secs: 5,
        });
        let err = converter
            .convert_to_mp3(
                &PathBuf::from("in.m4a"),
                &PathBuf::from("out.mp3"),
                Quality::High,
            )
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Failed to execute ffmpeg"), "got: {msg}");
    }

    #[tokio::test]
    async fn test_health_check_missing_binary() {
        let converter = AudioConverter::new(ConverterConfig {
            ffmpeg_bin: "definitely-not-a-real-binary-name".to_string(),
            timeout_secs: 5,
        });
        assert!(!converter.health_check().await.unwrap());
    }
}
