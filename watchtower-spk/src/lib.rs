//! watchtower-spk: Persona-voiced speech synthesis
//!
//! Provides text-to-speech for hero dialogue with:
//! - An OpenAI speech API engine and a closure-backed custom engine
//! - Per-persona voice selection and punctuation shaping
//! - Write-once audio artifacts served under a static URL prefix

pub mod error;
pub mod config;
pub mod engines;
pub mod store;
pub mod synthesizer;

pub use error::SpeechError;
pub use config::{ApiTtsConfig, RetryConfig, SpeechConfig, VoiceConfig};
pub use engines::TtsEngine;
pub use store::{ArtifactStore, FileArtifactStore};
pub use synthesizer::SpeechSynthesizer;
