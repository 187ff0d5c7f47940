use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::app::App;
use crate::core::completion::{Completion, CompletionError, CompletionService, RequestContext};
use crate::core::config::Config;
use crate::core::message::Message;

/// What a [`ScriptedService`] does for one call.
#[derive(Clone, Debug)]
pub enum Reply {
    /// Sleeps for `after`, then answers. Ignores cancellation and deadlines.
    Text { text: String, after: Duration },
    /// Sleeps for `after`, then answers, giving up early when the request
    /// context is done.
    Cooperative { text: String, after: Duration },
    /// Answers with zero choices.
    Empty,
    /// Fails with an API error carrying `message`.
    Fail(String),
    /// Never returns.
    Hang,
}

impl Reply {
    pub fn text(text: &str, after: Duration) -> Self {
        Reply::Text {
            text: text.to_string(),
            after,
        }
    }

    pub fn cooperative(text: &str, after: Duration) -> Self {
        Reply::Cooperative {
            text: text.to_string(),
            after,
        }
    }
}

/// Completion service that replays a script, one [`Reply`] per call, and
/// records every history it was handed.
#[derive(Clone, Default)]
pub struct ScriptedService {
    script: Arc<Mutex<VecDeque<Reply>>>,
    calls: Arc<Mutex<Vec<Vec<Message>>>>,
    finished: Arc<Mutex<usize>>,
}

impl ScriptedService {
    pub fn new(script: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls that ran to completion, including discarded ones.
    pub fn finished(&self) -> usize {
        *self.finished.lock().unwrap()
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    async fn complete(
        &self,
        ctx: &RequestContext,
        history: Vec<Message>,
        _model: &str,
    ) -> Result<Completion, CompletionError> {
        self.calls.lock().unwrap().push(history);
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Hang);

        let result = match reply {
            Reply::Text { text, after } => {
                tokio::time::sleep(after).await;
                Ok(Completion::single(text))
            }
            Reply::Cooperative { text, after } => {
                ctx.run(async move {
                    tokio::time::sleep(after).await;
                    Ok(Completion::single(text))
                })
                .await
            }
            Reply::Empty => Ok(Completion::default()),
            Reply::Fail(message) => Err(CompletionError::Api {
                status: 500,
                message,
            }),
            Reply::Hang => std::future::pending().await,
        };
        *self.finished.lock().unwrap() += 1;
        result
    }
}

pub fn create_test_app(service: ScriptedService) -> App {
    create_test_app_with_config(service, Config::default(), None)
}

pub fn create_test_app_with_config(
    service: ScriptedService,
    config: Config,
    config_path: Option<PathBuf>,
) -> App {
    App::with_service(config, config_path, Arc::new(service))
}
