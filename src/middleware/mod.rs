//! Request extractors and middleware layers.

pub mod auth;
pub mod extract;
pub mod rate_limit;
