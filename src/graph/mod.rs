//! Bidirectional dependency graph over workflow files.
//!
//! The graph indexes every workflow file under a workflows root by its
//! canonical repository-relative path. For each node it keeps the ordered
//! list of resolved dependency paths, and alongside it a derived reverse
//! index from dependency to importers. The reverse index is updated
//! transactionally inside every mutation rather than recomputed lazily, so
//! the affected-workflow query stays proportional to the affected set.
//!
//! Invariant: for every node `p` and dependency `d` in `p`'s imports, `p`
//! is a member of `reverse_imports[d]`. Every mutation keeps both maps in
//! lockstep.
//!
//! The graph tolerates everything a repository can throw at it: declared
//! dependencies that do not exist yet (recorded anyway), import cycles
//! (recorded as mutual edges, guarded by visited sets during traversal),
//! and malformed files (which fail only their own insertion).
//!
//! Not safe for concurrent mutation: callers serialize mutations against
//! queries externally.

use anyhow::{Context, Result};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::MarkflowError;
use crate::markdown::imports::extract_imports;
use crate::resolver::{normalize_path, parent_dir, resolve_import_path};

/// State held per workflow file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowNode {
    /// Resolved dependency paths, declaration order, deduplicated.
    imports: Vec<String>,
}

impl WorkflowNode {
    /// Resolved dependency paths of this file.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }
}

/// The dependency graph for one workflows root.
#[derive(Debug)]
pub struct WorkflowGraph {
    /// Filesystem root the repository-relative paths hang off.
    repo_root: PathBuf,
    /// Repository-relative workflows directory, forward slashes.
    workflows_root: String,
    /// Forward index: path to node state.
    nodes: HashMap<String, WorkflowNode>,
    /// Derived reverse index: dependency path to set of importers.
    reverse_imports: HashMap<String, HashSet<String>>,
}

impl WorkflowGraph {
    /// Create an empty graph for incremental population.
    pub fn new(repo_root: impl Into<PathBuf>, workflows_root: &str) -> Self {
        Self {
            repo_root: repo_root.into(),
            workflows_root: normalize_path(workflows_root),
            nodes: HashMap::new(),
            reverse_imports: HashMap::new(),
        }
    }

    /// Build a graph from every markdown file under the workflows root.
    ///
    /// A file whose front matter fails to parse is skipped with a warning;
    /// it fails only its own insertion, never the build.
    pub fn build(repo_root: impl Into<PathBuf>, workflows_root: &str) -> Result<Self> {
        let mut graph = Self::new(repo_root, workflows_root);
        let scan_root = graph.repo_root.join(&graph.workflows_root);

        for entry in WalkDir::new(&scan_root).follow_links(false) {
            let entry = entry
                .with_context(|| format!("failed to scan workflows: {}", scan_root.display()))?;
            if !entry.file_type().is_file()
                || entry.path().extension().and_then(|e| e.to_str()) != Some("md")
            {
                continue;
            }

            let Some(path) = graph.to_repo_relative(entry.path()) else {
                continue;
            };
            if let Err(err) = graph.add_workflow(&path) {
                tracing::warn!("skipping workflow '{path}': {err}");
            }
        }

        tracing::debug!(
            "built workflow graph: {} nodes under '{}'",
            graph.nodes.len(),
            graph.workflows_root
        );
        Ok(graph)
    }

    /// The repository-relative workflows root this graph covers.
    pub fn workflows_root(&self) -> &str {
        &self.workflows_root
    }

    /// Number of known workflow files.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a file is a known node.
    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(&normalize_path(path))
    }

    /// Resolved dependencies of a known file.
    pub fn imports_of(&self, path: &str) -> Option<&[String]> {
        self.nodes.get(&normalize_path(path)).map(|node| node.imports())
    }

    /// Direct importers of a path, empty if nothing imports it.
    pub fn importers_of(&self, path: &str) -> Vec<String> {
        let mut importers: Vec<String> = self
            .reverse_imports
            .get(&normalize_path(path))
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        importers.sort();
        importers
    }

    /// Parse a file and insert it as a node.
    ///
    /// Declared dependencies need not exist on disk; they are recorded
    /// regardless. A malformed file fails only this insertion.
    pub fn add_workflow(&mut self, path: &str) -> Result<()> {
        let path = normalize_path(path);
        let imports = self.compute_edges(&path)?;
        tracing::debug!("add workflow '{path}' with {} imports", imports.len());
        self.replace_edges(&path, imports);
        Ok(())
    }

    /// Re-parse a file and replace its edge set.
    ///
    /// Stale reverse entries are removed and new ones added in the same
    /// mutation. Calling this twice with no file change is a no-op the
    /// second time.
    pub fn update_workflow(&mut self, path: &str) -> Result<()> {
        let path = normalize_path(path);
        let imports = self.compute_edges(&path)?;
        tracing::debug!("update workflow '{path}' with {} imports", imports.len());
        self.replace_edges(&path, imports);
        Ok(())
    }

    /// Delete a node, cleaning up its reverse entries.
    ///
    /// Dangling forward references held by *other* nodes are left alone;
    /// they resolve lazily the next time those nodes are updated. Returns
    /// whether the node existed.
    pub fn remove_workflow(&mut self, path: &str) -> bool {
        let path = normalize_path(path);
        let Some(node) = self.nodes.remove(&path) else {
            return false;
        };

        for dep in &node.imports {
            if let Some(importers) = self.reverse_imports.get_mut(dep) {
                importers.remove(&path);
                if importers.is_empty() {
                    self.reverse_imports.remove(dep);
                }
            }
        }

        tracing::debug!("removed workflow '{path}'");
        true
    }

    /// Whether a file is a top-level workflow, i.e. a compile target.
    ///
    /// True iff the file's immediate parent directory is the workflows root
    /// exactly. Files in subdirectories are shared fragments.
    pub fn is_top_level(&self, path: &str) -> bool {
        parent_dir(&normalize_path(path)) == self.workflows_root
    }

    /// All known top-level workflows, sorted.
    pub fn top_level_workflows(&self) -> Vec<String> {
        let mut top: Vec<String> =
            self.nodes.keys().filter(|p| self.is_top_level(p)).cloned().collect();
        top.sort();
        top
    }

    /// The minimal set of top-level workflows needing recompilation after a
    /// change to `path`, sorted.
    ///
    /// - Unknown and not top-level: every known top-level workflow. The
    ///   over-approximation trades unnecessary rebuilds for never missing
    ///   one.
    /// - Top-level, known or not: just the file itself.
    /// - Known fragment: transitive reverse traversal, visited-set guarded
    ///   against cycles and diamond duplicates.
    pub fn affected_workflows(&self, path: &str) -> Vec<String> {
        let path = normalize_path(path);
        let top_level = self.is_top_level(&path);

        if !self.nodes.contains_key(&path) {
            if top_level {
                return vec![path];
            }
            tracing::debug!("unknown fragment '{path}': returning all top-level workflows");
            return self.top_level_workflows();
        }

        if top_level {
            return vec![path];
        }

        let mut affected = Vec::new();
        let mut visited: HashSet<String> = HashSet::from([path.clone()]);
        let mut queue: VecDeque<String> = VecDeque::from([path]);

        while let Some(current) = queue.pop_front() {
            let Some(importers) = self.reverse_imports.get(&current) else {
                continue;
            };
            for importer in importers {
                if !visited.insert(importer.clone()) {
                    continue;
                }
                if self.is_top_level(importer) {
                    affected.push(importer.clone());
                }
                queue.push_back(importer.clone());
            }
        }

        affected.sort();
        affected
    }

    /// Dependencies-first ordering over the known nodes.
    ///
    /// Edges to dependencies that are not themselves nodes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MarkflowError::CircularDependency`] when a cycle makes the
    /// ordering impossible. Cycles are legal graph state; only this query
    /// rejects them.
    pub fn topological_order(&self) -> Result<Vec<String>, MarkflowError> {
        let mut digraph: DiGraph<&str, ()> = DiGraph::new();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

        for path in self.nodes.keys() {
            indices.insert(path, digraph.add_node(path));
        }
        for (path, node) in &self.nodes {
            for dep in &node.imports {
                if let (Some(&from), Some(&to)) =
                    (indices.get(path.as_str()), indices.get(dep.as_str()))
                {
                    digraph.add_edge(from, to, ());
                }
            }
        }

        match toposort(&digraph, None) {
            // Reverse so dependencies come before their importers
            Ok(order) => {
                Ok(order.into_iter().rev().map(|idx| digraph[idx].to_string()).collect())
            }
            Err(cycle) => Err(MarkflowError::CircularDependency {
                cycle: digraph[cycle.node_id()].to_string(),
            }),
        }
    }

    /// Read and parse a file, producing its resolved, deduplicated edge
    /// list. Resolution is relative to the file being scanned.
    fn compute_edges(&self, path: &str) -> Result<Vec<String>> {
        let full_path = self.repo_root.join(path);
        let content = fs::read_to_string(&full_path)
            .with_context(|| format!("failed to read workflow: {}", full_path.display()))?;

        let mut imports = Vec::new();
        let mut seen = HashSet::new();
        for edge in extract_imports(&content, path)? {
            let resolved = resolve_import_path(&edge.path, path);
            if seen.insert(resolved.clone()) {
                imports.push(resolved);
            }
        }
        Ok(imports)
    }

    /// Swap a node's edge list, diffing against the previous set so the
    /// reverse index never drifts.
    fn replace_edges(&mut self, path: &str, imports: Vec<String>) {
        let previous = self
            .nodes
            .insert(path.to_string(), WorkflowNode {
                imports: imports.clone(),
            })
            .map(|node| node.imports)
            .unwrap_or_default();

        let old_set: HashSet<&String> = previous.iter().collect();
        let new_set: HashSet<&String> = imports.iter().collect();

        for stale in old_set.difference(&new_set) {
            if let Some(importers) = self.reverse_imports.get_mut(*stale) {
                importers.remove(path);
                if importers.is_empty() {
                    self.reverse_imports.remove(*stale);
                }
            }
        }
        for added in new_set.difference(&old_set) {
            self.reverse_imports.entry((*added).clone()).or_default().insert(path.to_string());
        }
    }

    /// Convert a filesystem path under the repo root to the canonical
    /// repository-relative form.
    fn to_repo_relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.repo_root).ok()?;
        let segments: Vec<&str> =
            relative.components().filter_map(|c| c.as_os_str().to_str()).collect();
        Some(segments.join("/"))
    }
}
