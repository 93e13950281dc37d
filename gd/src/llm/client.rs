//! ChatClient trait definition

use async_trait::async_trait;
use tracing::debug;

use super::LlmError;

/// Narrow text generator used as the small-talk fallback
///
/// Each call is independent; the caller folds any history it wants into
/// `prompt`.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn generate_reply(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Client used when no chat provider is configured; every call fails
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineClient;

#[async_trait]
impl ChatClient for OfflineClient {
    async fn generate_reply(&self, _prompt: &str) -> Result<String, LlmError> {
        debug!("OfflineClient::generate_reply: called");
        Err(LlmError::Unavailable("no chat provider configured".to_string()))
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// One scripted outcome of the mock client
    #[derive(Debug, Clone)]
    pub enum Scripted {
        Reply(String),
        Fail,
        Stall(Duration),
    }

    /// Mock chat client for tests; replays its script then fails
    pub struct MockChatClient {
        script: Vec<Scripted>,
        call_count: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl MockChatClient {
        pub fn new(script: Vec<Scripted>) -> Self {
            debug!(script_len = %script.len(), "MockChatClient::new: called");
            Self {
                script,
                call_count: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|r| Scripted::Reply(r.to_string())).collect())
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Prompts received so far, in order
        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl ChatClient for MockChatClient {
        async fn generate_reply(&self, prompt: &str) -> Result<String, LlmError> {
            debug!("MockChatClient::generate_reply: called");
            if let Ok(mut prompts) = self.prompts.lock() {
                prompts.push(prompt.to_string());
            }
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            match self.script.get(idx).cloned() {
                Some(Scripted::Reply(text)) => Ok(text),
                Some(Scripted::Fail) => Err(LlmError::Status {
                    status: 500,
                    message: "scripted failure".to_string(),
                }),
                Some(Scripted::Stall(delay)) => {
                    tokio::time::sleep(delay).await;
                    Ok("too late".to_string())
                }
                None => Err(LlmError::Unusable("No more mock responses".to_string())),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_client_replays_script() {
            let client = MockChatClient::new(vec![Scripted::Reply("hi".to_string()), Scripted::Fail]);

            assert_eq!(client.generate_reply("one").await.unwrap(), "hi");
            assert!(client.generate_reply("two").await.is_err());
            assert!(client.generate_reply("three").await.is_err());
            assert_eq!(client.call_count(), 3);
            assert_eq!(client.prompts(), vec!["one", "two", "three"]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_client_always_fails() {
        let client = OfflineClient;
        let err = client.generate_reply("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::Unavailable(_)));
    }
}
