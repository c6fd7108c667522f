//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::state::{App, GenerationSettings};
use crate::inference::{CompletionProvider, CompletionRequest, ProviderError};

/// A provider that replays canned replies in order and counts calls.
///
/// Once the script runs out every call fails with a network error, so a test
/// that issues more calls than it scripted fails loudly.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Network("script exhausted".to_string())))
    }
}

/// Creates a test App backed by an empty ScriptedProvider.
pub fn test_app() -> App {
    App::new(GenerationSettings {
        provider: Some(ScriptedProvider::new(Vec::new())),
        model_name: "test-model".to_string(),
    })
}

/// Creates a test App as if no credential had been configured.
pub fn test_app_without_provider() -> App {
    App::new(GenerationSettings {
        provider: None,
        model_name: "test-model".to_string(),
    })
}
