//! Lunar System Core - Shared types library.
//!
//! This crate provides common types used across the Lunar System components:
//! - `storefront` - The public storefront page (catalog, cart, sign-in)
//! - `cli` - Command-line tools for migrations and catalog inspection
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no session access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for identifiers, prices, categories and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
