//! Core types and trait definitions for the profiles service.
//!
//! This crate is free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod access;
pub mod account;
pub mod error;
pub mod feed;
pub mod secret;
pub mod store;
pub mod token;
pub mod validation;

pub use error::{Error, Result};
