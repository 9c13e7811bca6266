//! Rewriting local references for publishing.
//!
//! Publishing a workflow to another repository requires every local fragment
//! reference to become a durable, versioned workflowspec. The rewriter takes
//! a file's content, resolves each local import or include relative to the
//! file's own location, and replaces it with
//! `owner/repo/resolved-path@ref`. A commit SHA is preferred over a version
//! tag when both are known, since the SHA is the reproducible pin.
//!
//! References that are already workflowspec-shaped pass through untouched,
//! as do pure `#Section` references. `#section` suffixes are re-appended
//! after rewriting.
//!
//! The file is reconstructed rather than patched: front matter is
//! re-serialized with the fixed field-priority ordering, and the body is
//! emitted with only directive lines rewritten (to the serialized
//! `{{#import ...}}` form); every other line passes through unchanged.
//!
//! [`rewrite_includes_on_disk`] extends the conversion to nested fragments
//! with an explicit worklist bounded by a visited set, so deep or cyclic
//! fragment trees convert without unbounded call-stack growth.

use anyhow::{Context, Result};
use serde_yaml::Value;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::Path;

use crate::core::MarkflowError;
use crate::markdown::imports::{extract_imports, parse_include_directive, split_section};
use crate::markdown::{render_workflow, split_frontmatter};
use crate::resolver::{is_workflow_spec, normalize_path, resolve_import_path};
use crate::utils::fs::atomic_write;

/// Rewrite one local reference into a workflowspec.
///
/// Already-qualified references and pure section references come back
/// unchanged.
fn rewrite_reference(
    reference: &str,
    repo_slug: &str,
    commit_sha: Option<&str>,
    version_tag: Option<&str>,
    origin_file: &str,
) -> String {
    let (path, section) = split_section(reference);
    if path.is_empty() || is_workflow_spec(&path) {
        return reference.to_string();
    }

    let resolved = resolve_import_path(&path, origin_file);
    let mut spec = format!("{repo_slug}/{resolved}");
    // SHA pinning beats a tag: the commit is the reproducible reference.
    if let Some(pin) = commit_sha.or(version_tag) {
        spec.push('@');
        spec.push_str(pin);
    }
    if let Some(section) = section {
        spec.push('#');
        spec.push_str(&section);
    }
    spec
}

/// Convert every local import and include in `content` into a versioned
/// workflowspec, returning the reconstructed file.
///
/// `origin_file` is the repository-relative path the content was read from;
/// relative imports resolve against it.
///
/// # Errors
///
/// Returns [`MarkflowError::Frontmatter`] when the front matter block is
/// present but malformed.
pub fn rewrite_imports_for_publish(
    content: &str,
    repo_slug: &str,
    commit_sha: Option<&str>,
    version_tag: Option<&str>,
    origin_file: &str,
) -> Result<String> {
    let (map, body) = split_frontmatter(content).map_err(|err| MarkflowError::Frontmatter {
        path: origin_file.to_string(),
        reason: err.to_string(),
    })?;

    let map = map.map(|mut map| {
        if let Some(Value::Sequence(entries)) = map.get_mut(Value::String("imports".into())) {
            for entry in entries.iter_mut() {
                match entry {
                    Value::String(reference) => {
                        *reference = rewrite_reference(
                            reference,
                            repo_slug,
                            commit_sha,
                            version_tag,
                            origin_file,
                        );
                    }
                    Value::Mapping(object) => {
                        if let Some(Value::String(reference)) =
                            object.get_mut(Value::String("path".into()))
                        {
                            *reference = rewrite_reference(
                                reference,
                                repo_slug,
                                commit_sha,
                                version_tag,
                                origin_file,
                            );
                        }
                    }
                    _ => {}
                }
            }
        }
        map
    });

    let mut lines: Vec<String> = Vec::with_capacity(body.lines().count());
    for line in body.lines() {
        let rewritten = match parse_include_directive(line) {
            Some(directive) if !directive.path.is_empty() && !is_workflow_spec(&directive.path) => {
                let indent = &line[..line.len() - line.trim_start().len()];
                let marker = if directive.optional { "?" } else { "" };
                let reference = match &directive.section {
                    Some(section) => format!("{}#{section}", directive.path),
                    None => directive.path.clone(),
                };
                let spec =
                    rewrite_reference(&reference, repo_slug, commit_sha, version_tag, origin_file);
                format!("{indent}{{{{#import{marker} {spec}}}}}")
            }
            _ => line.to_string(),
        };
        lines.push(rewritten);
    }

    let mut new_body = lines.join("\n");
    if body.ends_with('\n') {
        new_body.push('\n');
    }

    render_workflow(map.as_ref(), &new_body)
}

/// Transitively rewrite a workflow and its on-disk include targets.
///
/// Walks the include relation with an explicit worklist and visited set,
/// rewriting each reachable file in place via atomic writes. Include targets
/// that do not exist on disk are skipped; whether that is an error is
/// decided at vendoring time, not here. Returns the rewritten paths in
/// visit order.
pub fn rewrite_includes_on_disk(
    repo_root: &Path,
    origin_file: &str,
    repo_slug: &str,
    commit_sha: Option<&str>,
    version_tag: Option<&str>,
) -> Result<Vec<String>> {
    let mut rewritten = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut worklist: VecDeque<String> = VecDeque::from([normalize_path(origin_file)]);

    while let Some(path) = worklist.pop_front() {
        if !visited.insert(path.clone()) {
            continue;
        }

        let full_path = repo_root.join(&path);
        if !full_path.exists() {
            tracing::debug!("skipping missing include target '{path}'");
            continue;
        }
        let content = fs::read_to_string(&full_path)
            .with_context(|| format!("failed to read workflow: {}", full_path.display()))?;

        // Enqueue local dependencies from the original content before the
        // references are converted away.
        for edge in extract_imports(&content, &path)? {
            if !is_workflow_spec(&edge.path) {
                worklist.push_back(resolve_import_path(&edge.path, &path));
            }
        }

        let converted =
            rewrite_imports_for_publish(&content, repo_slug, commit_sha, version_tag, &path)?;
        if converted != content {
            atomic_write(&full_path, converted.as_bytes())?;
        }
        rewritten.push(path);
    }

    Ok(rewritten)
}
