pub mod app;
pub mod chat_client;
pub mod completion;
pub mod config;
pub mod conversation;
pub mod coordinator;
pub mod message;
