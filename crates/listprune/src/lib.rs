//! listprune - Klaviyo list reconciliation and resumable profile deletion
//!
//! This crate provides:
//! - Command-line configuration
//! - The `collect` command: list aggregation and work queue construction
//! - The `delete` command: the paced, resumable deletion run

pub mod commands;
pub mod config;

pub use config::Config;
