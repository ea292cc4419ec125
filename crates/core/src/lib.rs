//! Core types for serialstore
//!
//! This crate defines the vocabulary shared by every layer:
//! - [`Value`]: the stored value model
//! - [`Error`] / [`Result`]: the error taxonomy
//! - [`Key`] and [`OperationKind`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use types::{Key, OperationKind};
pub use value::Value;
