//! dggterm is a terminal client for destiny.gg-style chat rooms.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`session`] connects to the chat server and turns its frames into typed
//!   [`core::event::ChatEvent`]s pushed into a bounded channel.
//! - [`core`] owns the event channel, the dispatch loop that routes each event
//!   to one render behavior, the startup roster barrier, input history and
//!   configuration.
//! - [`ui`] renders the terminal interface and runs the interactive event loop
//!   that drives user input and display updates.
//! - [`commands`] implements the local slash commands used by the chat loop.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which loads configuration and hands over to
//! [`ui::chat_loop`] for interactive sessions.

pub mod cli;
pub mod commands;
pub mod core;
pub mod session;
pub mod ui;
pub mod utils;
