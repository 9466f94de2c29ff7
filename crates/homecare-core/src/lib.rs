//! # homecare-core
//!
//! Core crate for the HomeCare reminder backend. Contains configuration
//! schemas, typed identifiers, the injectable clock, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other HomeCare crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
