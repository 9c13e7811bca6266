//! Core types shared across the crate.
//!
//! Currently this is the home of [`MarkflowError`], the typed error enum used
//! wherever callers need to distinguish failure modes. Most operation-level
//! functions return [`anyhow::Result`] and attach path context as errors
//! propagate; the typed variants are reserved for the cases the design treats
//! specially (a single malformed file, a missing mandatory include, an
//! invalid remote reference, a dependency cycle).

mod error;

pub use error::MarkflowError;
