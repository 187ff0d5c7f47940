//! Single-flight request coordination for conversation turns.
//!
//! The [`Coordinator`] owns the conversation store and at most one
//! outstanding request. Each [`Coordinator::submit`] supersedes whatever was
//! still in flight, spawns the completion call on its own task and returns a
//! [`PendingTurn`] that resolves to exactly one [`TurnEvent`]. The chat loop
//! hands that event back through [`Coordinator::resolve`], which drops events
//! belonging to superseded turns.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::completion::{CompletionError, CompletionService, RequestContext};
use crate::core::conversation::ConversationStore;
use crate::core::message::Message;

/// Deadline handed to the completion service for each call.
pub const DEFAULT_INNER_TIMEOUT: Duration = Duration::from_secs(10);

/// Failsafe after which the coordinator gives up on a call by itself.
pub const DEFAULT_OUTER_TIMEOUT: Duration = Duration::from_secs(15);

pub const EMPTY_RESPONSE_REASON: &str = "No response received from API";

pub type TurnId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnResult {
    Success(String),
    Failure(String),
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnEvent {
    pub turn_id: TurnId,
    pub result: TurnResult,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("inner deadline ({inner:?}) must be shorter than the outer failsafe ({outer:?})")]
pub struct TimeoutOrderError {
    pub inner: Duration,
    pub outer: Duration,
}

/// The two nested timeouts bounding one completion call. `inner` is always
/// strictly shorter than `outer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    inner: Duration,
    outer: Duration,
}

impl Timeouts {
    pub fn new(inner: Duration, outer: Duration) -> Result<Self, TimeoutOrderError> {
        if inner >= outer {
            return Err(TimeoutOrderError { inner, outer });
        }
        Ok(Self { inner, outer })
    }

    pub fn inner(&self) -> Duration {
        self.inner
    }

    pub fn outer(&self) -> Duration {
        self.outer
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            inner: DEFAULT_INNER_TIMEOUT,
            outer: DEFAULT_OUTER_TIMEOUT,
        }
    }
}

struct RequestHandle {
    turn_id: TurnId,
    token: CancellationToken,
    done: Arc<AtomicBool>,
}

impl RequestHandle {
    fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    fn cancel(&self) -> bool {
        if self.is_done() {
            return false;
        }
        self.token.cancel();
        true
    }
}

/// A submitted turn. Awaiting it yields the turn's single terminal event.
pub struct PendingTurn {
    turn_id: TurnId,
    inner: BoxFuture<'static, TurnEvent>,
}

impl PendingTurn {
    pub fn turn_id(&self) -> TurnId {
        self.turn_id
    }
}

impl Future for PendingTurn {
    type Output = TurnEvent;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

pub struct Coordinator {
    store: ConversationStore,
    service: Arc<dyn CompletionService>,
    model: String,
    timeouts: Timeouts,
    outstanding: Option<RequestHandle>,
    current_turn: TurnId,
}

impl Coordinator {
    pub fn new(service: Arc<dyn CompletionService>, model: impl Into<String>) -> Self {
        Self {
            store: ConversationStore::new(),
            service,
            model: model.into(),
            timeouts: Timeouts::default(),
            outstanding: None,
            current_turn: 0,
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Swaps the completion service used by later turns. A turn already in
    /// flight keeps the service it started with.
    pub fn set_service(&mut self, service: Arc<dyn CompletionService>) {
        self.service = service;
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub fn current_turn(&self) -> Option<TurnId> {
        (self.current_turn > 0).then_some(self.current_turn)
    }

    /// True from `submit` until the turn's event has been passed to
    /// [`Coordinator::resolve`]. Unlike [`Coordinator::is_busy`] this stays
    /// true while a finished turn's event is still queued.
    pub fn has_unresolved_turn(&self) -> bool {
        self.outstanding.is_some()
    }

    /// True while a submitted turn has not reached its terminal event.
    pub fn is_busy(&self) -> bool {
        self.outstanding
            .as_ref()
            .is_some_and(|handle| !handle.is_done())
    }

    pub fn submit(&mut self, prompt: impl Into<String>) -> PendingTurn {
        if let Some(previous) = self.outstanding.take() {
            if previous.cancel() {
                debug!(turn_id = previous.turn_id, "Superseding outstanding turn");
            }
        }

        self.store.append_user(prompt);
        let history = self.store.snapshot();

        self.current_turn += 1;
        let turn_id = self.current_turn;
        let ctx = RequestContext::new(self.timeouts.inner);
        let done = Arc::new(AtomicBool::new(false));
        self.outstanding = Some(RequestHandle {
            turn_id,
            token: ctx.token().clone(),
            done: Arc::clone(&done),
        });

        debug!(
            turn_id,
            history_len = history.len(),
            model = %self.model,
            "Submitting turn"
        );

        let (tx, rx) = oneshot::channel();
        spawn_completion(
            Arc::clone(&self.service),
            ctx.clone(),
            history,
            self.model.clone(),
            turn_id,
            tx,
        );

        let outer = self.timeouts.outer;
        let outer_deadline = Instant::now() + outer;
        let token = ctx.token().clone();
        let race = async move {
            let result = tokio::select! {
                biased;
                outcome = rx => match outcome {
                    Ok(result) => result,
                    Err(_) if token.is_cancelled() => TurnResult::Canceled,
                    Err(_) => TurnResult::Failure(
                        "completion task ended without a result".to_string(),
                    ),
                },
                _ = tokio::time::sleep_until(outer_deadline) => {
                    token.cancel();
                    debug!(turn_id, "Outer failsafe fired");
                    TurnResult::Failure(format!(
                        "request timed out after {} seconds. Please try again.",
                        outer.as_secs()
                    ))
                }
                _ = token.cancelled() => TurnResult::Canceled,
            };
            done.store(true, Ordering::SeqCst);
            TurnEvent { turn_id, result }
        };

        PendingTurn {
            turn_id,
            inner: race.boxed(),
        }
    }

    /// Cancels the outstanding turn. Returns false when nothing was in
    /// flight.
    pub fn cancel(&mut self) -> bool {
        match &self.outstanding {
            Some(handle) if handle.cancel() => {
                debug!(turn_id = handle.turn_id, "Turn canceled");
                true
            }
            _ => false,
        }
    }

    /// Accepts a terminal event from a [`PendingTurn`]. Returns `None` for
    /// events that belong to a superseded turn.
    pub fn resolve(&mut self, event: TurnEvent) -> Option<TurnResult> {
        if event.turn_id != self.current_turn {
            debug!(
                turn_id = event.turn_id,
                current_turn = self.current_turn,
                "Dropping event from superseded turn"
            );
            return None;
        }

        if self
            .outstanding
            .as_ref()
            .is_some_and(|handle| handle.turn_id == event.turn_id)
        {
            self.outstanding = None;
        }

        debug!(turn_id = event.turn_id, result = ?event.result, "Turn resolved");
        Some(event.result)
    }

    /// Records a reply the user has been shown.
    pub fn record_reply(&self, text: impl Into<String>) {
        self.store.append_assistant(text);
    }

    pub fn clear_history(&self) {
        self.store.reset();
    }
}

fn spawn_completion(
    service: Arc<dyn CompletionService>,
    ctx: RequestContext,
    history: Vec<Message>,
    model: String,
    turn_id: TurnId,
    tx: oneshot::Sender<TurnResult>,
) {
    tokio::spawn(async move {
        let outcome = service.complete(&ctx, history, &model).await;

        if ctx.is_cancelled() {
            debug!(turn_id, "Discarding result of canceled turn");
            return;
        }

        let outcome = if Instant::now() >= ctx.deadline() {
            debug!(turn_id, "Discarding result that arrived after the inner deadline");
            Err(CompletionError::DeadlineExceeded(ctx.timeout()))
        } else {
            outcome
        };

        let result = match outcome {
            Ok(completion) => match completion.into_first_choice() {
                Some(text) => TurnResult::Success(text),
                None => TurnResult::Failure(EMPTY_RESPONSE_REASON.to_string()),
            },
            Err(CompletionError::DeadlineExceeded(timeout)) => TurnResult::Failure(format!(
                "request timed out after {} seconds. Please try again.",
                timeout.as_secs()
            )),
            Err(err) => TurnResult::Failure(err.to_string()),
        };

        // The receiver is gone once the turn resolved another way.
        let _ = tx.send(result);
    });
}
