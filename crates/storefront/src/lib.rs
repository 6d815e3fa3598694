//! Vitrine storefront library.
//!
//! Client-side storefront logic: the catalog client, the persisted cart and
//! favorites, and the auth session, wired together by [`state::AppState`].
//! Front ends (the `vitrine` CLI, tests) drive it through that state.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod filters;
pub mod notify;
pub mod services;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
