//! Import path resolution.
//!
//! Turns a dependency path as written in a workflow file into the canonical
//! repository-relative form used as the graph key. Resolution is purely
//! lexical: no filesystem access, deterministic output, forward slashes
//! regardless of the host platform.
//!
//! Three cases:
//!
//! - Workflowspec-shaped references (`@` present) are already qualified and
//!   pass through unchanged.
//! - A leading `/` means repository-root-relative; the slash is stripped.
//! - Anything else resolves against the directory of the importing file,
//!   with `.` and `..` components collapsed.

pub mod workflow_spec;

pub use workflow_spec::WorkflowSpec;

/// Whether a reference is workflowspec-shaped rather than a local path.
///
/// The two forms are discriminated solely by the presence of `@`.
pub fn is_workflow_spec(reference: &str) -> bool {
    reference.contains('@')
}

/// Resolve an import path relative to the file importing it.
///
/// `importing_file` is the canonical repository-relative path of the file
/// that declared the import.
pub fn resolve_import_path(import_path: &str, importing_file: &str) -> String {
    if is_workflow_spec(import_path) {
        return import_path.to_string();
    }

    if let Some(root_relative) = import_path.strip_prefix('/') {
        return normalize_path(root_relative);
    }

    match parent_dir(importing_file) {
        "" => normalize_path(import_path),
        dir => normalize_path(&format!("{dir}/{import_path}")),
    }
}

/// Directory component of a forward-slash path, empty at the top.
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}

/// Lexically normalize a path: collapse `.` and `..`, drop empty segments,
/// and convert any backslashes to forward slashes.
///
/// Leading `..` segments that would escape the root are preserved, matching
/// ordinary lexical cleaning.
pub fn normalize_path(path: &str) -> String {
    let forward = path.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();

    for segment in forward.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                None | Some(&"..") => segments.push(".."),
                Some(_) => {
                    segments.pop();
                }
            },
            other => segments.push(other),
        }
    }

    segments.join("/")
}
