#[cfg(test)]
mod dialogue_tests {
    use crate::dialogue::{DialogueComposer, DialogueRequest, DEFAULT_USER_MESSAGE};
    use crate::error::{LLMError, Result};
    use crate::generator::TextGenerator;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use watchtower_core::{
        Character, ConversationTurn, PersonaCatalog, PersonaId, WeatherSnapshot,
    };

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String> {
            Err(LLMError::Provider("backend down".to_string()))
        }
    }

    /// Records every call and answers with a fixed reply.
    struct RecordingGenerator {
        reply: String,
        calls: Mutex<Vec<(String, u32, f32)>>,
    }

    impl RecordingGenerator {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn last_prompt(&self) -> String {
            self.calls.lock().last().map(|c| c.0.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
            self.calls.lock().push((prompt.to_string(), max_tokens, temperature));
            Ok(self.reply.clone())
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl TextGenerator for SlowGenerator {
        async fn generate(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }
    }

    fn persona(id: PersonaId) -> Character {
        Character::from(PersonaCatalog::builtin().get(id))
    }

    #[tokio::test]
    async fn test_failing_generator_gives_distinct_fallbacks() {
        let composer = DialogueComposer::new(Arc::new(FailingGenerator));
        let mut lines = HashSet::new();
        for id in PersonaId::ALL {
            let line = composer.compose(&DialogueRequest::new(persona(id))).await;
            assert!(!line.is_empty());
            assert_ne!(line, Character::Generic.fallback_line());
            lines.insert(line);
        }
        assert_eq!(lines.len(), PersonaId::ALL.len());
    }

    #[tokio::test]
    async fn test_generic_character_fallback() {
        let composer = DialogueComposer::new(Arc::new(FailingGenerator));
        let line = composer.compose(&DialogueRequest::new(Character::Generic)).await;
        assert_eq!(line, Character::Generic.fallback_line());
    }

    #[tokio::test]
    async fn test_empty_output_falls_back() {
        let composer = DialogueComposer::new(Arc::new(RecordingGenerator::new("   \n")));
        let line = composer.compose(&DialogueRequest::new(persona(PersonaId::Aquaman))).await;
        assert_eq!(line, persona(PersonaId::Aquaman).fallback_line());
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let composer = DialogueComposer::new(Arc::new(SlowGenerator))
            .with_timeout(Duration::from_millis(20));
        let line = composer.compose(&DialogueRequest::new(persona(PersonaId::TheFlash))).await;
        assert_eq!(line, persona(PersonaId::TheFlash).fallback_line());
    }

    #[tokio::test]
    async fn test_generated_text_is_trimmed() {
        let composer = DialogueComposer::new(Arc::new(RecordingGenerator::new("  By the gods.  ")));
        let line = composer.compose(&DialogueRequest::new(persona(PersonaId::WonderWoman))).await;
        assert_eq!(line, "By the gods.");
    }

    #[tokio::test]
    async fn test_sampling_parameters() {
        let generator = Arc::new(RecordingGenerator::new("ok"));
        let composer = DialogueComposer::new(generator.clone());
        let batman = persona(PersonaId::Batman);

        composer.compose(&DialogueRequest::new(batman)).await;
        composer
            .compose(&DialogueRequest::new(batman).with_max_tokens(500))
            .await;

        let calls = generator.calls.lock();
        assert_eq!(calls[0].1, 250);
        assert_eq!(calls[0].2, 0.7);
        assert_eq!(calls[1].1, 500);
    }

    #[tokio::test]
    async fn test_prompt_contents() {
        let generator = Arc::new(RecordingGenerator::new("ok"));
        let composer = DialogueComposer::new(generator.clone());
        let snapshot = WeatherSnapshot::new(12.34, "Light rain", Some(18.0), false).with_humidity(Some(81.0));
        let superman = persona(PersonaId::Superman);

        let request = DialogueRequest::new(superman)
            .with_weather(&snapshot)
            .with_location("Gotham")
            .with_message(Some("Should I bring an umbrella?"));
        composer.compose(&request).await;

        let prompt = generator.last_prompt();
        assert!(prompt.starts_with(superman.description()));
        assert!(prompt.contains("Respond as Superman"));
        assert!(prompt.contains("Current weather in Gotham"));
        assert!(prompt.contains("12.3°C"));
        assert!(prompt.contains("light rain"));
        assert!(prompt.contains("Humidity: 81%"));
        assert!(prompt.contains("Wind Speed: 18.0 km/h"));
        assert!(prompt.contains("User's Question: Should I bring an umbrella?"));
        assert!(!prompt.contains("Recent Conversation"));
    }

    #[test]
    fn test_prompt_omits_unknown_temperature() {
        let snapshot = WeatherSnapshot::new(None::<f64>, "Overcast", None, true);
        let batman = persona(PersonaId::Batman);
        let request = DialogueRequest::new(batman).with_weather(&snapshot).with_location("Gotham");

        let prompt = DialogueComposer::build_prompt(&request);
        assert!(prompt.contains("Current weather in Gotham: Condition: overcast"));
        assert!(!prompt.contains("Temperature"));
        assert!(!prompt.contains("0.0°C"));
    }

    #[test]
    fn test_prompt_uses_last_three_turns() {
        let turns = vec![
            ConversationTurn::user("turn one"),
            ConversationTurn::assistant("turn two"),
            ConversationTurn::user("turn three"),
            ConversationTurn::assistant("turn four"),
        ];
        let request = DialogueRequest::new(persona(PersonaId::Batman)).with_turns(&turns);
        let prompt = DialogueComposer::build_prompt(&request);

        assert!(!prompt.contains("turn one"));
        assert!(prompt.contains("assistant: turn two"));
        assert!(prompt.contains("user: turn three"));
        assert!(prompt.contains("assistant: turn four"));
    }

    #[test]
    fn test_default_message() {
        let request = DialogueRequest::new(Character::Generic).with_message(Some("   "));
        assert_eq!(request.effective_message(), DEFAULT_USER_MESSAGE);

        let prompt = DialogueComposer::build_prompt(&DialogueRequest::new(Character::Generic));
        assert!(prompt.contains("User's Question: Give me a weather report."));
        assert!(prompt.contains("your location"));
        assert!(prompt.contains("No weather data available"));
    }
}
