//! Story Generator
//!
//! Builds the two-message fairy-tale prompt and runs the chat model through
//! the backoff executor. The topic is expected to be English and already
//! cleared by the input moderation gate.

use tracing::{debug, info};

use crate::ai::backoff::BackoffExecutor;
use crate::ai::provider::{ChatMessage, SharedChat};
use crate::types::{Result, TaleError};

/// Fixed system persona: child-safe, creative, and compliant with the
/// image model's content policy, since the story is illustrated downstream.
const STORY_PERSONA: &str = "You are an excellent fairy tale writer. \
The fairy tale you write will be sent to an image-generation model to be \
illustrated, so write a creative children's story for the given topic \
that never violates the image model's content policy.";

/// Generates a fairy tale for a moderation-cleared English topic
pub struct StoryGenerator {
    chat: SharedChat,
    executor: BackoffExecutor,
    temperature: f32,
}

impl StoryGenerator {
    pub fn new(chat: SharedChat, executor: BackoffExecutor, temperature: f32) -> Self {
        Self {
            chat,
            executor,
            temperature,
        }
    }

    /// Generate story prose for the topic
    pub async fn generate(&self, topic: &str) -> Result<String> {
        if topic.trim().is_empty() {
            return Err(TaleError::EmptyInput { field: "subject" });
        }

        let messages = [
            ChatMessage::system(STORY_PERSONA),
            ChatMessage::user(format!("fairy tale topic : {}", topic)),
        ];

        debug!(provider = self.chat.name(), temperature = self.temperature, "generating story");

        let story = self
            .executor
            .run(|| self.chat.complete(&messages, self.temperature))
            .await?;

        info!(chars = story.len(), "story generated");
        Ok(story)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::backoff::BackoffPolicy;
    use crate::types::{ErrorKind, ProviderError};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct MockChat {
        reply: &'static str,
        calls: AtomicU32,
        seen: Mutex<Vec<(Vec<ChatMessage>, f32)>>,
        rate_limit_first: u32,
        fail_with: Option<ErrorKind>,
    }

    impl MockChat {
        fn replying(reply: &'static str) -> Self {
            Self {
                reply,
                calls: AtomicU32::new(0),
                seen: Mutex::new(Vec::new()),
                rate_limit_first: 0,
                fail_with: None,
            }
        }
    }

    #[async_trait]
    impl crate::ai::provider::ChatProvider for MockChat {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            temperature: f32,
        ) -> std::result::Result<String, ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((messages.to_vec(), temperature));

            if let Some(kind) = self.fail_with {
                return Err(ProviderError::new(kind, "mock", "provider failure"));
            }
            if call < self.rate_limit_first {
                return Err(ProviderError::new(ErrorKind::RateLimited, "mock", "429"));
            }
            Ok(self.reply.to_string())
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn fast_executor() -> BackoffExecutor {
        BackoffExecutor::new(BackoffPolicy {
            initial_delay: Duration::from_millis(1),
            exponential_base: 2.0,
            jitter: false,
            max_retries: 3,
        })
    }

    #[tokio::test]
    async fn test_generate_builds_persona_and_topic_messages() {
        let chat = Arc::new(MockChat::replying("Once upon a time, a brave rabbit..."));
        let generator = StoryGenerator::new(chat.clone(), fast_executor(), 1.3);

        let story = generator.generate("a brave rabbit").await.unwrap();
        assert!(story.starts_with("Once upon a time"));

        let seen = chat.seen.lock().unwrap();
        let (messages, temperature) = &seen[0];
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("fairy tale writer"));
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "fairy tale topic : a brave rabbit");
        assert!((temperature - 1.3).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_topic() {
        let chat = Arc::new(MockChat::replying("story"));
        let generator = StoryGenerator::new(chat.clone(), fast_executor(), 1.3);

        let result = generator.generate("   ").await;
        assert!(matches!(result, Err(TaleError::EmptyInput { .. })));
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_retries_rate_limits() {
        let chat = Arc::new(MockChat {
            rate_limit_first: 2,
            ..MockChat::replying("story")
        });
        let generator = StoryGenerator::new(chat.clone(), fast_executor(), 1.3);

        let story = generator.generate("topic").await.unwrap();
        assert_eq!(story, "story");
        assert_eq!(chat.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_generate_surfaces_auth_error() {
        let chat = Arc::new(MockChat {
            fail_with: Some(ErrorKind::Auth),
            ..MockChat::replying("story")
        });
        let generator = StoryGenerator::new(chat.clone(), fast_executor(), 1.3);

        let err = generator.generate("topic").await.unwrap_err();
        assert_eq!(err.http_status(), 500);
        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
    }
}
