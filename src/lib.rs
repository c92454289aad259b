pub mod chat;
pub mod constants;
pub mod conversation;
pub mod domain;
pub mod gemini;
pub mod prompt;
pub mod web_server;
