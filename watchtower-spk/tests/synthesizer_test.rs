//! Tests for persona-aware speech synthesis

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::sync::Notify;
use tokio_test::{assert_err, assert_ok};
use watchtower_core::{Character, PersonaCatalog, PersonaId};
use watchtower_spk::config::{SpeechConfig, VoiceConfig};
use watchtower_spk::engines::custom::CustomTtsEngine;
use watchtower_spk::engines::TtsEngine;
use watchtower_spk::error::SpeechError;
use watchtower_spk::store::{ArtifactStore, FileArtifactStore};
use watchtower_spk::SpeechSynthesizer;

type Calls = Arc<Mutex<Vec<(String, VoiceConfig)>>>;

fn recording_engine(calls: Calls) -> Arc<dyn TtsEngine> {
    Arc::new(CustomTtsEngine::from_fn("recording", move |text: &str, voice: &VoiceConfig| {
        calls.lock().push((text.to_string(), voice.clone()));
        Ok(Bytes::from_static(b"ID3audio"))
    }))
}

fn failing_engine() -> Arc<dyn TtsEngine> {
    Arc::new(CustomTtsEngine::from_fn("failing", |_text: &str, _voice: &VoiceConfig| {
        Err(SpeechError::Api("503 Service Unavailable".to_string()))
    }))
}

fn persona(id: PersonaId) -> Character {
    Character::from(PersonaCatalog::builtin().get(id))
}

fn synthesizer(engine: Arc<dyn TtsEngine>, dir: &TempDir) -> SpeechSynthesizer {
    let store: Arc<dyn ArtifactStore> = Arc::new(FileArtifactStore::new(dir.path(), "/static"));
    SpeechSynthesizer::with_engine(SpeechConfig::default(), engine, store).unwrap()
}

struct SlowEngine;

#[async_trait]
impl TtsEngine for SlowEngine {
    async fn synthesize(&self, _text: &str, _config: &VoiceConfig) -> Result<Bytes, SpeechError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Bytes::from_static(b"late"))
    }

    async fn list_voices(&self) -> Result<Vec<String>, SpeechError> {
        Ok(vec![])
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Signals when a request reaches it, then never answers.
struct StalledEngine {
    started: Arc<Notify>,
}

#[async_trait]
impl TtsEngine for StalledEngine {
    async fn synthesize(&self, _text: &str, _config: &VoiceConfig) -> Result<Bytes, SpeechError> {
        self.started.notify_one();
        std::future::pending().await
    }

    async fn list_voices(&self) -> Result<Vec<String>, SpeechError> {
        Ok(vec![])
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "stalled"
    }
}

struct BrokenStore;

#[async_trait]
impl ArtifactStore for BrokenStore {
    async fn store(&self, _audio: Bytes) -> Result<String, SpeechError> {
        Err(SpeechError::Store("read-only filesystem".to_string()))
    }
}

#[tokio::test]
async fn test_audio_url_points_at_stored_file() {
    let dir = TempDir::new().unwrap();
    let calls: Calls = Arc::default();
    let synth = synthesizer(recording_engine(calls.clone()), &dir);

    let url = synth
        .synthesize("The gods have blessed us.", persona(PersonaId::WonderWoman))
        .await
        .unwrap();
    let file_name = url.strip_prefix("/static/").unwrap();
    assert!(file_name.ends_with(".mp3"));
    assert!(dir.path().join(file_name).is_file());
}

#[tokio::test]
async fn test_voice_profile_is_used() {
    let dir = TempDir::new().unwrap();
    let calls: Calls = Arc::default();
    let synth = synthesizer(recording_engine(calls.clone()), &dir);

    synth.synthesize("Hello.", persona(PersonaId::Aquaman)).await;
    synth.synthesize("Hello.", Character::Generic).await;

    let calls = calls.lock();
    assert_eq!(calls[0].1.name.as_deref(), Some("onyx"));
    assert_eq!(calls[0].1.speed, 0.85);
    assert_eq!(calls[1].1.name.as_deref(), Some("onyx"));
    assert_eq!(calls[1].1.speed, 1.0);
}

#[tokio::test]
async fn test_shaping_applies_to_speech_only() {
    let dir = TempDir::new().unwrap();
    let calls: Calls = Arc::default();
    let synth = synthesizer(recording_engine(calls.clone()), &dir);

    let dialogue = "Stay alert,citizen.";
    synth.synthesize(dialogue, persona(PersonaId::Batman)).await;
    synth.synthesize("Go!Now.", persona(PersonaId::TheFlash)).await;
    synth.synthesize("Up.", persona(PersonaId::Superman)).await;

    assert_eq!(dialogue, "Stay alert,citizen.");
    let calls = calls.lock();
    assert_eq!(calls[0].0, "Stay alert, citizen. ");
    assert_eq!(calls[1].0, "Go! Now... ");
    assert_eq!(calls[2].0, "Up.");
}

#[tokio::test]
async fn test_failing_engine_yields_no_audio() {
    let dir = TempDir::new().unwrap();
    let synth = synthesizer(failing_engine(), &dir);

    assert_eq!(synth.synthesize("Hello.", persona(PersonaId::Superman)).await, None);
    assert_err!(synth.render("Hello.", persona(PersonaId::Superman)).await);
    assert_eq!(std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0), 0);
}

#[tokio::test]
async fn test_timeout_yields_no_audio() {
    let dir = TempDir::new().unwrap();
    let synth = synthesizer(Arc::new(SlowEngine), &dir).with_timeout(Duration::from_millis(20));

    let result = synth.render("Hello.", persona(PersonaId::TheFlash)).await;
    assert!(matches!(result, Err(SpeechError::Timeout(_))));
    assert_eq!(synth.synthesize("Hello.", persona(PersonaId::TheFlash)).await, None);
}

#[tokio::test]
async fn test_empty_audio_yields_no_audio() {
    let dir = TempDir::new().unwrap();
    let engine: Arc<dyn TtsEngine> = Arc::new(CustomTtsEngine::from_fn("silent", |_t: &str, _v: &VoiceConfig| {
        Ok(Bytes::new())
    }));
    let synth = synthesizer(engine, &dir);
    assert_eq!(synth.synthesize("Hello.", Character::Generic).await, None);
}

#[tokio::test]
async fn test_oversize_audio_is_rejected() {
    let dir = TempDir::new().unwrap();
    let engine: Arc<dyn TtsEngine> = Arc::new(CustomTtsEngine::from_fn("big", |_t: &str, _v: &VoiceConfig| {
        Ok(Bytes::from(vec![0u8; 2048]))
    }));
    let store: Arc<dyn ArtifactStore> = Arc::new(FileArtifactStore::new(dir.path(), "/static"));
    let config = SpeechConfig {
        max_audio_bytes: 1024,
        ..Default::default()
    };
    let synth = SpeechSynthesizer::with_engine(config, engine, store).unwrap();
    assert_eq!(synth.synthesize("Hello.", Character::Generic).await, None);
}

#[tokio::test]
async fn test_disabled_synthesizer() {
    let dir = TempDir::new().unwrap();
    let calls: Calls = Arc::default();
    let store: Arc<dyn ArtifactStore> = Arc::new(FileArtifactStore::new(dir.path(), "/static"));
    let config = SpeechConfig {
        enabled: false,
        ..Default::default()
    };
    let synth = SpeechSynthesizer::with_engine(config, recording_engine(calls.clone()), store.clone()).unwrap();

    assert!(!synth.is_enabled());
    assert!(matches!(synth.render("Hi.", Character::Generic).await, Err(SpeechError::Disabled)));
    assert_eq!(synth.synthesize("Hi.", Character::Generic).await, None);
    assert!(calls.lock().is_empty());

    assert!(!SpeechSynthesizer::disabled(store).is_enabled());
}

#[tokio::test]
async fn test_blank_text_is_not_sent() {
    let dir = TempDir::new().unwrap();
    let calls: Calls = Arc::default();
    let synth = synthesizer(recording_engine(calls.clone()), &dir);

    assert_eq!(synth.synthesize("   ", Character::Generic).await, None);
    assert!(calls.lock().is_empty());
    assert_ok!(synth.render("ok", Character::Generic).await);
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn ArtifactStore> = Arc::new(FileArtifactStore::new(dir.path(), "/static"));
    let config = SpeechConfig {
        queue_size: 0,
        ..Default::default()
    };
    let result = SpeechSynthesizer::with_engine(config, failing_engine(), store);
    assert!(matches!(result, Err(SpeechError::Config(_))));
}

#[tokio::test]
async fn test_store_failure_yields_no_audio() {
    let calls: Calls = Arc::default();
    let synth = SpeechSynthesizer::with_engine(
        SpeechConfig::default(),
        recording_engine(calls.clone()),
        Arc::new(BrokenStore),
    )
    .unwrap();

    assert_eq!(synth.synthesize("Hello.", persona(PersonaId::Batman)).await, None);
    assert!(matches!(
        synth.render("Hello.", persona(PersonaId::Batman)).await,
        Err(SpeechError::Store(_))
    ));
    assert_eq!(calls.lock().len(), 2);
}

#[tokio::test]
async fn test_store_under_regular_file_leaves_nothing_behind() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, b"x").unwrap();

    let calls: Calls = Arc::default();
    let store: Arc<dyn ArtifactStore> = Arc::new(FileArtifactStore::new(blocker.join("audio"), "/static"));
    let synth = SpeechSynthesizer::with_engine(SpeechConfig::default(), recording_engine(calls), store).unwrap();

    assert_eq!(synth.synthesize("Hello.", Character::Generic).await, None);
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(std::fs::read(&blocker).unwrap(), b"x");
}

#[tokio::test]
async fn test_queue_wait_counts_against_timeout() {
    let dir = TempDir::new().unwrap();
    let started = Arc::new(Notify::new());
    let engine: Arc<dyn TtsEngine> = Arc::new(StalledEngine {
        started: started.clone(),
    });
    let store: Arc<dyn ArtifactStore> = Arc::new(FileArtifactStore::new(dir.path(), "/static"));
    let config = SpeechConfig {
        queue_size: 1,
        ..Default::default()
    };
    let synth = Arc::new(
        SpeechSynthesizer::with_engine(config, engine, store)
            .unwrap()
            .with_timeout(Duration::from_millis(300)),
    );

    let first = tokio::spawn({
        let synth = synth.clone();
        async move { synth.render("Hello.", Character::Generic).await }
    });
    started.notified().await;

    // The only slot is taken; the second request must give up within its own timeout.
    let begun = Instant::now();
    let second = synth.render("Hello.", Character::Generic).await;
    assert!(matches!(second, Err(SpeechError::Timeout(_))));
    assert!(begun.elapsed() < Duration::from_millis(550));

    assert!(matches!(first.await.unwrap(), Err(SpeechError::Timeout(_))));
}
