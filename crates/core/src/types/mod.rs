//! Core types for Lunar System.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod id;
pub mod price;

pub use category::Category;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
