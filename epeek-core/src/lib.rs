//! Shared primitives for the ePeek widgets.
//!
//! `epeek-core` provides the foundation that the tree and genome crates build on:
//!
//! - **Error types** — [`EpeekError`] and [`Result`] for structured error handling
//! - **Traits** — Small cross-crate abstractions like [`Summarizable`] and [`Annotated`]

pub mod error;
pub mod traits;

pub use error::{EpeekError, Result};
pub use traits::*;
