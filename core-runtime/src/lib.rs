//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the avatar sync core:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate holds the settings every other crate reads and the logging
//! conventions they emit through. It performs no network I/O.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
