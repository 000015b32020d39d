//! Charade is a terminal-first chat client for persona-driven assistant APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns runtime state: the per-character session store, the
//!   character directory cache, scripted greetings, and configuration.
//! - [`api`] defines the wire payloads and the HTTP client used to talk to
//!   the remote chat, character-directory, and conversation-log endpoints.
//! - [`commands`] implements slash-command parsing and the command registry
//!   used by the chat loop.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop that drives user input and display updates.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into [`ui::chat_loop`] for
//! interactive sessions and into the admin subcommands otherwise.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
