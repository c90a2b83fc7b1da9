//! verbatim — run the convert → transcribe → export pipeline from the shell.
//!
//! ```text
//! verbatim meeting.m4a --quality medium
//! ```
//!
//! Writes `<stem>.mp3`, `<stem>.json`, and `<stem>.txt` into the output
//! directory. Requires `AAI_API_KEY` in the environment (or a `.env` file).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;

use verbatim_core::Quality;
use verbatim_inference::transcription::AssemblyAiBackend;
use verbatim_media::{AudioConverter, ConverterConfig, TranscriptionPipeline};

#[derive(Parser)]
#[command(name = "verbatim", version, about = "Convert, transcribe, and export an audio file")]
struct Cli {
    /// Audio file to transcribe (resolved against --input-dir unless absolute)
    input: PathBuf,

    /// Bitrate tier: high, medium, or low
    #[arg(short, long, default_value = "high")]
    quality: Quality,

    /// Directory holding input recordings
    #[arg(long, default_value = "inputs")]
    input_dir: PathBuf,

    /// Directory receiving the .mp3/.json/.txt outputs
    #[arg(long, default_value = "outputs")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verbatim=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let input_path = if cli.input.is_absolute() {
        cli.input.clone()
    } else {
        cli.input_dir.join(&cli.input)
    };
    if !input_path.exists() {
        bail!("Input file not found: {}", input_path.display());
    }

    let backend =
        AssemblyAiBackend::from_env().context("AAI_API_KEY missing in environment or .env")?;

    let converter = AudioConverter::new(ConverterConfig::default());
    if !converter.health_check().await.unwrap_or(false) {
        bail!("ffmpeg is not installed or not on PATH");
    }

    let base_name = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .context("Input filename has no stem")?;

    let pipeline = TranscriptionPipeline::new(converter, Arc::new(backend), cli.output_dir);

    println!(
        "Transcribing {} (quality: {})...",
        input_path.display(),
        cli.quality.as_str()
    );
    let output = pipeline.run(&input_path, &base_name, cli.quality).await?;

    println!("Job {} complete:", output.result.id);
    println!("  audio:      {}", output.mp3_path.display());
    println!("  transcript: {}", output.txt_path.display());
    println!("  raw json:   {}", output.json_path.display());
    println!(
        "  {} utterances, {} characters",
        output.result.utterances.len(),
        output.result.text.len()
    );

    Ok(())
}
