//! markflow - dependency management for markdown workflow files
//!
//! Workflow definitions are markdown files with YAML front matter that can
//! import other fragments, either from the local repository or pinned to a
//! remote repository and commit. This crate maintains the dependency graph
//! over those files and drives two workflows on top of it:
//!
//! - **Incremental recompilation**: when a shared fragment changes, answer
//!   which top-level workflows need to be recompiled, and only those.
//! - **Publishing and vendoring**: rewrite local fragment references into
//!   versioned `owner/repo/path@ref` pointers for cross-repository reuse,
//!   and copy a workflow plus its full include closure into a consumer
//!   repository.
//!
//! # File Format
//!
//! A workflow file is UTF-8 markdown with optional YAML front matter
//! delimited by `---` lines. Dependencies are declared two ways:
//!
//! ```markdown
//! ---
//! imports:
//!   - shared/common.md
//!   - path: shared/tools.md
//!     inputs:
//!       model: large
//! ---
//!
//! @include shared/setup.md
//! @include? shared/extras.md#Optional-Section
//! ```
//!
//! Front matter `imports:` entries are plain path strings or `{path, inputs}`
//! objects. Body `@include` directives take a path with an optional
//! `#section` suffix; `@include?` marks the include optional. The serialized
//! form `{{#import path}}` / `{{#import? path}}` is recognized as the same
//! directive kind.
//!
//! # Layout Conventions
//!
//! Top-level workflows live directly inside the workflows root and are
//! compile targets. Fragments live in subdirectories (conventionally
//! `shared/...`) and are imported by workflows or by other fragments.
//!
//! # Core Modules
//!
//! - [`graph`] - Bidirectional dependency graph and the affected-workflow query
//! - [`markdown`] - Front matter parsing and import/include extraction
//! - [`resolver`] - Import path resolution and workflowspec references
//! - [`publish`] - Rewriting local references to versioned ones for publishing
//! - [`vendor`] - Include closure collection and the vendoring copy engine
//!
//! # Supporting Modules
//!
//! - [`core`] - Shared error types
//! - [`utils`] - Filesystem helpers (atomic writes, checksums)

pub mod core;
pub mod graph;
pub mod markdown;
pub mod publish;
pub mod resolver;
pub mod utils;
pub mod vendor;

pub use crate::core::MarkflowError;
pub use crate::graph::WorkflowGraph;
