pub mod builtin_personas;
pub mod chat_stream;
pub mod config;
pub mod conversation;
pub mod errors;
pub mod message;
pub mod persona;
pub mod selection;
pub mod session;
pub mod stream_errors;
pub mod transcript;
