//! Services that coordinate the catalog client with local state.
//!
//! - `auth` - Login, registration and the persisted session token

pub mod auth;
