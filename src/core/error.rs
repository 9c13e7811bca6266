//! Error types for markflow operations.
//!
//! The error model is deliberately small:
//!
//! - [`MarkflowError::Frontmatter`] - one file's front matter failed to
//!   parse. This fails that file's graph operation only; bulk operations
//!   skip the file with a warning and keep going.
//! - [`MarkflowError::MissingInclude`] - a non-optional include was absent
//!   at copy time. This fails the vendoring run, because a broken mandatory
//!   include would leave the destination workflow non-functional.
//! - [`MarkflowError::InvalidWorkflowSpec`] - a remote reference did not
//!   match `owner/repo/path[@ref]`.
//! - [`MarkflowError::CircularDependency`] - raised only when a topological
//!   order is requested; graph construction and traversal tolerate cycles.
//!
//! Optional-dependency absence is never an error, at extraction, collection,
//! or copy time. Plain filesystem failures propagate as [`anyhow::Error`]
//! with path context attached at the call site.

use std::path::PathBuf;
use thiserror::Error;

/// The typed error enum for markflow operations.
#[derive(Error, Debug)]
pub enum MarkflowError {
    /// Front matter in a single file could not be parsed as YAML.
    #[error("failed to parse front matter in '{path}': {reason}")]
    Frontmatter {
        /// Repository-relative path of the offending file.
        path: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A required (non-optional) include source does not exist at copy time.
    #[error("required include not found: {}", path.display())]
    MissingInclude {
        /// Filesystem path of the missing source.
        path: PathBuf,
    },

    /// A reference was not a valid `owner/repo/path[@ref]` workflowspec.
    #[error("invalid workflow reference '{spec}': expected owner/repo/path[@ref]")]
    InvalidWorkflowSpec {
        /// The reference as written.
        spec: String,
    },

    /// A dependency cycle prevented computing a topological order.
    #[error("circular dependency detected involving '{cycle}'")]
    CircularDependency {
        /// A workflow path on the cycle.
        cycle: String,
    },
}
