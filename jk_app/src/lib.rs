//! # jk_app
//!
//! Shared utilities for Jikan client applications

pub mod cli;
pub mod config_loader;
pub mod shutdown_handler;
pub mod tracing_setup;
