//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Key types for generational handles
//! - Logging utilities

pub mod collections;
pub mod logging;
