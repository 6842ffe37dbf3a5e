//! Slipbook Core - Shared types and arithmetic.
//!
//! This crate provides the types used across all Slipbook components:
//! - `web` - Owner dashboard, receipt generator, public storefront and admin back-office
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and easy to test.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails
//! - [`money`] - Lenient amount parsing and display formatting
//! - [`receipt`] - Line items, totals, payment method/status, receipt numbering
//! - [`analytics`] - Day and hour-of-day bucketing for sales charts
//! - [`profile`] - Business profile rules (slugs, onboarding, landing routes)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod money;
pub mod profile;
pub mod receipt;
pub mod types;

pub use types::*;
