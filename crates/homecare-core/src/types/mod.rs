//! Identifier types shared by every HomeCare crate.

pub mod id;

pub use id::*;
