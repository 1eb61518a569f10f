//! # rl_app
//!
//! Shared utilities for the rate-limited batch driver

pub mod cli;
pub mod config_loader;
pub mod driver;
pub mod tracing_setup;
