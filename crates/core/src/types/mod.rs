//! Core types for Slipbook.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;

pub use email::{Email, EmailError};
pub use id::*;
