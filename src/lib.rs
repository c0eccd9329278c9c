//! Client-side keystroke pipeline and session state machine for a typing
//! trainer whose scoring authority lives on a remote server.
//!
//! The binary in `main.rs` wires these modules to a terminal; integration
//! tests drive [`app::Trainer`] directly with a scripted exchange client.

pub mod app;
pub mod config;
pub mod engine;
pub mod event;
pub mod exchange;
pub mod poller;
pub mod session;
pub mod store;
pub mod ui;
pub mod view;
