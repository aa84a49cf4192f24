//! Repository Scanner
//!
//! Turns a local checkout into the `RepositoryDescriptor` the planner reads:
//! a sorted flat listing and an indented hierarchy built from it.

pub mod file_scanner;
pub mod tree;

pub use file_scanner::RepoScanner;
pub use tree::hierarchy_tree;
