//! codeaid is a line-oriented terminal chat assistant for OpenAI-compatible
//! APIs (OpenRouter by default).
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation store, the single-flight request
//!   coordinator, configuration, and the HTTP completion client.
//! - [`commands`] classifies input as a slash command or a model turn and
//!   runs the built-in commands.
//! - [`ui`] runs the interactive event loop that ties stdin, turn events and
//!   Ctrl-C together.
//! - [`api`] defines the chat payloads exchanged with the completion API.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which loads configuration and dispatches into
//! [`core::app`] and [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
