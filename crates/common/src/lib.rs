//! Common types and utilities for Rulewatch

pub mod config;

pub use config::Config;
