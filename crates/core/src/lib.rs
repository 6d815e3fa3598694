//! Vitrine Core - Shared types library.
//!
//! This crate provides common types used across all Vitrine components:
//! - `storefront` - Catalog client, local storage, cart, favorites and auth session
//! - `cli` - The interactive command-line storefront
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, roles and the catalog entities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
