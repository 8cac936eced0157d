//! Shared test helpers for relay tests.

use realtychat_core::error::ProviderError;
use realtychat_core::message::Message;
use realtychat_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A mock provider that records every request and replies from a script.
///
/// Once the script runs out it answers `"answer <n>"` for the n-th call, or
/// keeps failing if built with [`RecordingProvider::failing`].
pub struct RecordingProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    always_fail: Option<ProviderError>,
    delay: Option<Duration>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            always_fail: None,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `texts` in order, then fall back to numbered answers.
    pub fn replies<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        provider
            .script
            .lock()
            .unwrap()
            .extend(texts.into_iter().map(|t| Ok(t.into())));
        provider
    }

    /// Fail every call with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            always_fail: Some(error),
            ..Self::new()
        }
    }

    /// Queue a single failure ahead of whatever comes next.
    pub fn then_fail(self, error: ProviderError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Provider for RecordingProvider {
    fn name(&self) -> &str {
        "recording_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = &self.always_fail {
            return Err(error.clone());
        }

        let next = self.script.lock().unwrap().pop_front();
        let text = match next {
            Some(reply) => reply?,
            None => format!("answer {call}"),
        };

        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: request.model,
        })
    }
}
