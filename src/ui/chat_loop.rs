//! Line-oriented interactive session.
//!
//! [`run_chat`] multiplexes three sources on one task: lines read from stdin
//! by a reader task, terminal [`TurnEvent`]s forwarded from spawned
//! [`PendingTurn`](crate::core::coordinator::PendingTurn)s, and Ctrl-C. All
//! state changes go through [`ChatSession`], which tests drive directly.

use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::commands::{dispatch, matching_commands, run_command, Action, CommandResult};
use crate::core::app::App;
use crate::core::coordinator::{TurnEvent, TurnResult};

const PROMPT: &str = "> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub struct ChatSession<W: Write> {
    app: App,
    out: W,
    events: mpsc::UnboundedSender<TurnEvent>,
    prompt_pending: bool,
}

impl<W: Write> ChatSession<W> {
    /// Creates a session and the receiver its turn events arrive on.
    pub fn new(app: App, out: W) -> (Self, mpsc::UnboundedReceiver<TurnEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let session = Self {
            app,
            out,
            events,
            prompt_pending: true,
        };
        (session, rx)
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn print_banner(&mut self) -> io::Result<()> {
        writeln!(self.out, "codeaid - model: {}", self.app.coordinator.model())?;
        writeln!(
            self.out,
            "Type /help for commands. Ctrl-C cancels a request, or exits when idle."
        )
    }

    /// Prints the input prompt if one is owed and no turn is in flight.
    pub fn flush_prompt(&mut self) -> io::Result<()> {
        if self.prompt_pending && !self.app.coordinator.is_busy() {
            write!(self.out, "{PROMPT}")?;
            self.out.flush()?;
            self.prompt_pending = false;
        }
        Ok(())
    }

    pub fn handle_line(&mut self, line: &str) -> io::Result<LoopControl> {
        if line.trim().is_empty() {
            self.prompt_pending = true;
            return Ok(LoopControl::Continue);
        }

        match dispatch(line) {
            Action::RunCommand { name, args } => {
                let result = run_command(&mut self.app, &name, &args);
                self.prompt_pending = true;
                self.show_command_result(result)
            }
            Action::SendToModel(text) => {
                if text.trim_start().starts_with('/') {
                    self.print_command_hint(&text)?;
                }
                self.submit(text);
                Ok(LoopControl::Continue)
            }
        }
    }

    pub fn handle_turn_event(&mut self, event: TurnEvent) -> io::Result<()> {
        let Some(result) = self.app.coordinator.resolve(event) else {
            return Ok(());
        };

        match result {
            TurnResult::Success(text) => {
                writeln!(self.out, "{text}")?;
                self.app.coordinator.record_reply(text);
            }
            TurnResult::Failure(reason) => writeln!(self.out, "Error: {reason}")?,
            TurnResult::Canceled => writeln!(self.out, "Request canceled.")?,
        }
        self.prompt_pending = true;
        Ok(())
    }

    /// Ctrl-C: cancels the in-flight turn, or exits when idle. A turn whose
    /// event is still queued counts as in flight, so its reply is shown.
    pub fn handle_interrupt(&mut self) -> io::Result<LoopControl> {
        if self.app.coordinator.has_unresolved_turn() {
            self.app.coordinator.cancel();
            return Ok(LoopControl::Continue);
        }
        writeln!(self.out)?;
        Ok(LoopControl::Exit)
    }

    fn submit(&mut self, text: String) {
        let pending = self.app.coordinator.submit(text);
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = pending.await;
            if events.send(event).is_err() {
                debug!("Chat session closed before turn event was delivered");
            }
        });
    }

    fn show_command_result(&mut self, result: CommandResult) -> io::Result<LoopControl> {
        match result {
            CommandResult::HistoryCleared => {
                writeln!(self.out, "Conversation history cleared.")?;
                Ok(LoopControl::Continue)
            }
            CommandResult::Message(text) => {
                writeln!(self.out, "{}", text.trim_end())?;
                Ok(LoopControl::Continue)
            }
            CommandResult::Exit => Ok(LoopControl::Exit),
        }
    }

    fn print_command_hint(&mut self, text: &str) -> io::Result<()> {
        let word = text.split_whitespace().next().unwrap_or_default();
        let matches = matching_commands(word);
        if !matches.is_empty() {
            writeln!(
                self.out,
                "(not a command; did you mean {}?) Sending to the model.",
                matches.join(" or ")
            )?;
        }
        Ok(())
    }
}

pub async fn run_chat(app: App) -> io::Result<()> {
    let (mut session, mut events) = ChatSession::new(app, io::stdout());
    session.print_banner()?;

    let (line_tx, mut lines) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut reader = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match reader.next_line().await {
                Ok(Some(line)) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    debug!(error = %err, "Failed to read from stdin");
                    break;
                }
            }
        }
    });

    loop {
        session.flush_prompt()?;

        let control = tokio::select! {
            line = lines.recv() => match line {
                Some(line) => session.handle_line(&line)?,
                None => LoopControl::Exit,
            },
            Some(event) = events.recv() => {
                session.handle_turn_event(event)?;
                LoopControl::Continue
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                session.handle_interrupt()?
            }
        };

        if control == LoopControl::Exit {
            break;
        }
    }

    session.app_mut().coordinator.cancel();
    Ok(())
}
