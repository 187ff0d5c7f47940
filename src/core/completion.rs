//! The boundary between the request coordinator and whatever produces replies.
//!
//! A [`CompletionService`] receives an owned snapshot of the conversation and
//! a [`RequestContext`]. The context carries the cancellation token for the
//! turn and the inner deadline the service is expected to honor. Services that
//! ignore either are still safe to use: the coordinator discards late results
//! and enforces its own failsafe timeout.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::ChatResponse;
use crate::core::message::Message;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("request timed out after {} seconds", .0.as_secs())]
    DeadlineExceeded(Duration),

    #[error("request canceled")]
    Canceled,

    #[error("no API key configured; run `codeaid setup` or set OPENROUTER_API_KEY")]
    MissingApiKey,
}

/// Choices returned by a completion call, in the order the service sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub choices: Vec<String>,
}

impl Completion {
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            choices: vec![text.into()],
        }
    }

    pub fn into_first_choice(self) -> Option<String> {
        self.choices.into_iter().next()
    }
}

impl From<ChatResponse> for Completion {
    fn from(response: ChatResponse) -> Self {
        Self {
            choices: response
                .choices
                .into_iter()
                .map(|choice| choice.message.content.unwrap_or_default())
                .collect(),
        }
    }
}

/// Cancellation token plus inner deadline for one completion call.
#[derive(Clone, Debug)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Instant,
    timeout: Duration,
}

impl RequestContext {
    pub fn new(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Instant::now() + timeout,
            timeout,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context is canceled or its deadline passes.
    pub async fn done(&self) -> CompletionError {
        tokio::select! {
            _ = self.token.cancelled() => CompletionError::Canceled,
            _ = tokio::time::sleep_until(self.deadline) => {
                CompletionError::DeadlineExceeded(self.timeout)
            }
        }
    }

    /// Drives `work` until it finishes or the context is done, whichever
    /// comes first.
    pub async fn run<T, F>(&self, work: F) -> Result<T, CompletionError>
    where
        F: Future<Output = Result<T, CompletionError>>,
    {
        tokio::select! {
            result = work => result,
            err = self.done() => Err(err),
        }
    }
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        ctx: &RequestContext,
        history: Vec<Message>,
        model: &str,
    ) -> Result<Completion, CompletionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatResponseChoice, ChatResponseMessage};

    #[tokio::test(start_paused = true)]
    async fn run_returns_work_result_before_deadline() {
        let ctx = RequestContext::new(Duration::from_secs(10));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, CompletionError>("done")
            })
            .await;
        assert_eq!(result.unwrap(), "done");
    }

    #[tokio::test(start_paused = true)]
    async fn run_reports_deadline_exceeded() {
        let ctx = RequestContext::new(Duration::from_secs(10));
        let start = Instant::now();
        let result = ctx
            .run(std::future::pending::<Result<(), CompletionError>>())
            .await;
        assert!(matches!(
            result,
            Err(CompletionError::DeadlineExceeded(timeout)) if timeout == Duration::from_secs(10)
        ));
        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn run_reports_cancellation() {
        let ctx = RequestContext::new(Duration::from_secs(10));
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            canceller.cancel();
        });
        let result = ctx
            .run(std::future::pending::<Result<(), CompletionError>>())
            .await;
        assert!(matches!(result, Err(CompletionError::Canceled)));
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn completion_keeps_choice_order_and_fills_missing_content() {
        let response = ChatResponse {
            choices: vec![
                ChatResponseChoice {
                    message: ChatResponseMessage {
                        content: Some("first".into()),
                    },
                    finish_reason: None,
                },
                ChatResponseChoice {
                    message: ChatResponseMessage { content: None },
                    finish_reason: None,
                },
            ],
        };
        let completion = Completion::from(response);
        assert_eq!(completion.choices, vec!["first".to_string(), String::new()]);
        assert_eq!(completion.into_first_choice().as_deref(), Some("first"));
    }

    #[test]
    fn deadline_error_mentions_seconds() {
        let err = CompletionError::DeadlineExceeded(Duration::from_secs(10));
        assert_eq!(err.to_string(), "request timed out after 10 seconds");
    }
}
