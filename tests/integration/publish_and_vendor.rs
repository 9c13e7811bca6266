//! Publishing and vendoring pipeline, end to end.
//!
//! Models the real flow: an origin repository publishes a workflow at a
//! commit, local references become versioned workflowspecs, and a consumer
//! repository vendors the include closure.

use markflow::publish::{rewrite_imports_for_publish, rewrite_includes_on_disk};
use markflow::resolver::WorkflowSpec;
use markflow::vendor::{FileTracker, collect_include_dependencies, copy_dependencies};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SHA: &str = "4f2c1e8a9b0d3f6c7e5a1b2c3d4e5f6a7b8c9d0e";

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn publish_pins_every_local_reference() {
    let content = "---\non: push\nimports:\n  - shared/common.md\n---\n\n# Release\n\n@include shared/setup.md\n@include? shared/extras.md#Tips\n";

    let published = rewrite_imports_for_publish(
        content,
        "octo/workflows",
        Some(SHA),
        Some("v2.1.0"),
        "workflows/release.md",
    )
    .unwrap();

    // All three references pinned to the commit, not the tag.
    for expected in [
        format!("octo/workflows/workflows/shared/common.md@{SHA}"),
        format!("{{{{#import octo/workflows/workflows/shared/setup.md@{SHA}}}}}"),
        format!("{{{{#import? octo/workflows/workflows/shared/extras.md@{SHA}#Tips}}}}"),
    ] {
        assert!(published.contains(&expected), "missing '{expected}' in:\n{published}");
    }

    // What we emitted parses back as a valid pinned workflowspec.
    let spec = WorkflowSpec::parse(&format!("octo/workflows/workflows/shared/common.md@{SHA}"))
        .unwrap();
    assert!(spec.is_commit_pinned());
    assert_eq!(spec.repo_slug(), "octo/workflows");
}

#[test]
fn on_disk_rewrite_converts_nested_fragments() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "workflows/ci.md", "@include shared/outer.md\n");
    write_file(temp.path(), "workflows/shared/outer.md", "@include inner.md\n");
    write_file(temp.path(), "workflows/shared/inner.md", "# Inner\n");

    let rewritten =
        rewrite_includes_on_disk(temp.path(), "workflows/ci.md", "octo/repo", Some(SHA), None)
            .unwrap();
    assert_eq!(rewritten.len(), 3);

    let outer = fs::read_to_string(temp.path().join("workflows/shared/outer.md")).unwrap();
    assert!(outer.contains(&format!("octo/repo/workflows/shared/inner.md@{SHA}")));
}

#[test]
fn vendor_closure_into_consumer_repository() {
    let origin = TempDir::new().unwrap();
    let consumer = TempDir::new().unwrap();

    let workflow = "# Deploy\n\n@include shared/deploy-steps.md\n@include? shared/site-extras.md\n";
    write_file(
        origin.path(),
        "shared/deploy-steps.md",
        "@include shared/credentials.md#Vault\n",
    );
    write_file(origin.path(), "shared/credentials.md", "# Credentials\n");
    // site-extras.md deliberately absent: optional, must not break anything.

    let mut deps = Vec::new();
    let mut seen = HashSet::new();
    collect_include_dependencies(workflow, origin.path(), &mut deps, &mut seen, false).unwrap();
    assert_eq!(deps.len(), 3);

    let mut tracker = FileTracker::new();
    copy_dependencies(&deps, consumer.path(), false, false, Some(&mut tracker)).unwrap();

    assert_eq!(
        fs::read_to_string(consumer.path().join("shared/credentials.md")).unwrap(),
        "# Credentials\n"
    );
    assert!(consumer.path().join("shared/deploy-steps.md").exists());
    assert!(!consumer.path().join("shared/site-extras.md").exists());
    assert_eq!(tracker.created().len(), 2);
    assert!(tracker.modified().is_empty());

    // Second run against an unchanged consumer is a clean no-op.
    let mut second = FileTracker::new();
    copy_dependencies(&deps, consumer.path(), false, false, Some(&mut second)).unwrap();
    assert!(second.created().is_empty());
    assert!(second.modified().is_empty());
}

#[test]
fn vendor_respects_local_edits_unless_forced() {
    let origin = TempDir::new().unwrap();
    let consumer = TempDir::new().unwrap();

    write_file(origin.path(), "shared/tools.md", "upstream\n");
    write_file(consumer.path(), "shared/tools.md", "locally edited\n");

    let mut deps = Vec::new();
    let mut seen = HashSet::new();
    collect_include_dependencies(
        "@include shared/tools.md\n",
        origin.path(),
        &mut deps,
        &mut seen,
        false,
    )
    .unwrap();

    copy_dependencies(&deps, consumer.path(), false, false, None).unwrap();
    assert_eq!(
        fs::read_to_string(consumer.path().join("shared/tools.md")).unwrap(),
        "locally edited\n"
    );

    let mut tracker = FileTracker::new();
    copy_dependencies(&deps, consumer.path(), false, true, Some(&mut tracker)).unwrap();
    assert_eq!(
        fs::read_to_string(consumer.path().join("shared/tools.md")).unwrap(),
        "upstream\n"
    );
    assert_eq!(tracker.modified(), ["shared/tools.md"]);
}
