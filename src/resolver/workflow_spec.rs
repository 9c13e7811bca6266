//! Versioned, repository-qualified workflow references.
//!
//! A workflowspec replaces a local path for cross-repository reuse:
//! `owner/repo/path/to/file.md[@ref]`, where `ref` is a 40-character commit
//! SHA or an arbitrary tag or branch name. The publishing pipeline emits
//! these; consumers parse them back to fetch pinned content.

use std::fmt;

use crate::core::MarkflowError;

/// A parsed `owner/repo/path[@ref]` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSpec {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Path of the workflow file inside the repository.
    pub path: String,
    /// Pin: commit SHA, tag, or branch. `None` means the default branch.
    pub git_ref: Option<String>,
}

impl WorkflowSpec {
    /// Parse a workflowspec string.
    ///
    /// # Errors
    ///
    /// Returns [`MarkflowError::InvalidWorkflowSpec`] when any of the owner,
    /// repo, or path components is missing or empty.
    pub fn parse(spec: &str) -> Result<Self, MarkflowError> {
        let invalid = || MarkflowError::InvalidWorkflowSpec {
            spec: spec.to_string(),
        };

        let (body, git_ref) = match spec.split_once('@') {
            Some((_, "")) => return Err(invalid()),
            Some((body, reference)) => (body, Some(reference.to_string())),
            None => (spec, None),
        };

        let mut parts = body.splitn(3, '/');
        let owner = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let repo = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let path = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            path: path.to_string(),
            git_ref,
        })
    }

    /// The `owner/repo` slug.
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Whether the pin is a full 40-character commit SHA.
    pub fn is_commit_pinned(&self) -> bool {
        self.git_ref
            .as_deref()
            .is_some_and(|r| r.len() == 40 && r.chars().all(|c| c.is_ascii_hexdigit()))
    }
}

impl fmt::Display for WorkflowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.repo, self.path)?;
        if let Some(git_ref) = &self.git_ref {
            write!(f, "@{git_ref}")?;
        }
        Ok(())
    }
}
