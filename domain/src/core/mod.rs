//! Core domain concepts shared across all subdomains.
//!
//! - [`error::ResolveError`] - credential/configuration resolution errors
//! - [`string`] - small string helpers (bearer tokens, URL joining)

pub mod error;
pub mod string;
