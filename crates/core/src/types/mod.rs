//! Core types for Vitrine.
//!
//! This module provides type-safe wrappers for common domain concepts and
//! the read-only entities served by the catalog service.

pub mod catalog;
pub mod email;
pub mod id;
pub mod price;
pub mod role;

pub use catalog::{Category, Product, User};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price, UnknownCurrency};
pub use role::UserRole;
