//! Foundation types for the Tilde console.
//!
//! This crate contains the types shared by all Tilde crates: the error
//! taxonomy and the transcript line severity tags.

pub mod error;
pub mod severity;

pub use error::{Result, TildeError};
pub use severity::Severity;
