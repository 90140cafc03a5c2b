//! Ambulance network lookup cache
//!
//! This module exposes the cache, its consumers, and the CLI for use in integration tests.

pub mod cache;
pub mod cli;
pub mod config;
pub mod consumers;
