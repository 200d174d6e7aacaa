//! Parley is a line-oriented chat client for the Gemini API with one
//! conversation log per persona.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the persona registry, the session state machine that
//!   hydrates history from transcripts, the conversation driver, and the
//!   streaming Gemini client.
//! - [`commands`] parses operator input into chat commands.
//! - [`api`] defines the Gemini request/response payloads.
//! - [`utils`] holds the transcript log store and URL helpers.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`], which loads
//! configuration and runs [`cli::chat_loop`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod utils;
