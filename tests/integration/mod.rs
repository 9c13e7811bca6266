//! Integration test suite.
//!
//! Exercises the public API end to end against real temporary repositories:
//! graph builds, incremental updates, the affected-workflow query, the
//! publishing rewriter, and the vendoring pipeline.

mod affected_workflows;
mod publish_and_vendor;
