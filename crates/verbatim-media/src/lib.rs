//! # verbatim-media
//!
//! Audio conversion and transcript export pipeline for verbatim.
//!
//! This crate provides:
//! - ffmpeg-based normalization of uploads to mono 16 kHz MP3
//! - JSON/TXT transcript export writers
//! - The convert → transcribe → export pipeline shared by the HTTP API and
//!   the standalone CLI

pub mod convert;
pub mod export;
pub mod pipeline;

pub use convert::{AudioConverter, ConverterConfig};
pub use export::{render_txt, write_transcript_json, write_transcript_txt};
pub use pipeline::{remove_quietly, PipelineOutput, TranscriptionPipeline};
