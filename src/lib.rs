//! Core library for the `barrage` CLI.
//!
//! `barrage` drives a fixed number of HTTP requests (or as many as fit in a
//! time limit) through a pool of concurrent workers and reports latency
//! statistics. The building blocks are exposed so campaigns can be driven
//! with a custom [`http::Transport`] or [`http::RequestStrategy`]; the
//! primary interface remains the command-line application.
mod app;
pub mod args;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod report;
pub mod run;
pub mod shutdown;
pub mod shutdown_handlers;
