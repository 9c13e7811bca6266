//! End-to-end affected-workflow queries over a real repository layout.

use markflow::WorkflowGraph;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn shared_fragment_edit_recompiles_both_importers() {
    let temp = TempDir::new().unwrap();
    write_file(
        temp.path(),
        "workflows/a.md",
        "---\nimports:\n  - shared/common.md\n---\n\n# A\n",
    );
    write_file(
        temp.path(),
        "workflows/b.md",
        "---\nimports:\n  - shared/common.md\n---\n\n# B\n",
    );
    write_file(temp.path(), "workflows/shared/common.md", "# Common\n");

    let mut graph = WorkflowGraph::build(temp.path(), "workflows").unwrap();
    assert_eq!(
        graph.affected_workflows("workflows/shared/common.md"),
        vec!["workflows/a.md", "workflows/b.md"]
    );

    // a.md drops the import; only b.md remains affected.
    write_file(temp.path(), "workflows/a.md", "---\nimports: []\n---\n\n# A\n");
    graph.update_workflow("workflows/a.md").unwrap();
    assert_eq!(
        graph.affected_workflows("workflows/shared/common.md"),
        vec!["workflows/b.md"]
    );
}

#[test]
fn deep_include_chain_reaches_top_level() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "workflows/release.md", "@include shared/outer.md\n");
    write_file(temp.path(), "workflows/shared/outer.md", "@include middle.md\n");
    write_file(temp.path(), "workflows/shared/middle.md", "@include inner.md#Setup\n");
    write_file(temp.path(), "workflows/shared/inner.md", "# Inner\n");

    let graph = WorkflowGraph::build(temp.path(), "workflows").unwrap();

    // Section suffixes do not affect graph membership.
    assert_eq!(
        graph.affected_workflows("workflows/shared/inner.md"),
        vec!["workflows/release.md"]
    );
}

#[test]
fn unknown_fragment_falls_back_to_all_top_level() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "workflows/a.md", "# A\n");
    write_file(temp.path(), "workflows/b.md", "# B\n");

    let graph = WorkflowGraph::build(temp.path(), "workflows").unwrap();
    assert_eq!(
        graph.affected_workflows("workflows/shared/never-seen.md"),
        vec!["workflows/a.md", "workflows/b.md"]
    );
}

#[test]
fn add_and_remove_round_trip() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "workflows/a.md", "# A\n");
    let mut graph = WorkflowGraph::build(temp.path(), "workflows").unwrap();

    write_file(
        temp.path(),
        "workflows/c.md",
        "---\nimports:\n  - shared/common.md\n---\n\n# C\n",
    );
    write_file(temp.path(), "workflows/shared/common.md", "# Common\n");
    graph.add_workflow("workflows/c.md").unwrap();
    graph.add_workflow("workflows/shared/common.md").unwrap();

    assert_eq!(
        graph.affected_workflows("workflows/shared/common.md"),
        vec!["workflows/c.md"]
    );

    graph.remove_workflow("workflows/c.md");
    assert!(graph.affected_workflows("workflows/shared/common.md").is_empty());
}
