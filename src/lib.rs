//! Opschat is a full-screen terminal chat client for an ops assistant
//! backend that speaks a single `POST /chat` endpoint.
//!
//! The crate is organized around a few collaborating layers:
//! - [`core`] owns the panel state (transcript, typing placeholders, input,
//!   scrolling), message content rendering, and configuration.
//! - [`api`] sends one chat request per submission and decodes replies.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop that drives input and display updates.
//! - [`logging`] appends rendered messages to an optional transcript file.
//!
//! The runtime entrypoint lives in the binary crate (`src/main.rs`), which
//! loads configuration and hands the terminal to
//! [`ui::chat_loop::run_chat_loop`].

pub mod api;
pub mod core;
pub mod logging;
pub mod ui;
