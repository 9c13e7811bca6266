//! Cross-cutting utilities.

pub mod fs;

pub use fs::{atomic_write, calculate_checksum, ensure_dir};
