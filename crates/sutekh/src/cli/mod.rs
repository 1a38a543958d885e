//! # CLI Layer
//!
//! This module is **one client** of sutekhapp, not the application itself.
//!
//! The CLI layer is the **only** place that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs the tracing subscriber
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! Handlers call [`sutekhapp::api::SutekhApi`] and hand what it returns to
//! [`render`]; nothing here touches the store directly.

mod commands;
mod handlers;
mod render;
mod setup;
mod styles;

pub use commands::run;
