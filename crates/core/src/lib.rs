//! Shared contracts for the packforge serialization engine
//!
//! This crate holds what every layer above it agrees on:
//! - The error taxonomy (`DecodeError`, `FormatterNotFound`, the facade `Error`)
//! - Size limits for segments and decode recursion
//!
//! It deliberately carries no wire-format or buffer logic; those live in
//! `packforge-codec` and `packforge-buffer`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod limits;

pub use error::{DecodeError, Error, FormatterNotFound, Result};
