//! `sar` is a library for recursive, in-place literal search-and-replace.
//!
//! It provides the core logic for the `sar` command-line tool but can also be used
//! as a standalone library. The main components are:
//!
//! - `classifier`: decides whether a visited file is eligible (hidden paths,
//!   extension filter, NUL-byte binary detection).
//! - `file_io`: whole-file reads and in-place overwrites.
//! - `Replacer`: walks the tree and runs a preview or a write pass.
//! - `confirm`: the `(y/n)` gate between the two passes.
//! - `orchestrator`: sequences preview, confirmation and write.
//!
//! Everything runs on one thread; each file is opened, processed and closed before
//! the walk moves on.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod errors;
pub mod file_io;
pub mod logging;
pub mod orchestrator;
pub mod output_formatter;
pub mod replacer;

// Re-export main types for easier access by library users.
pub use config::RunConfig;
pub use errors::{Error, Result};
pub use orchestrator::{Outcome, run};
pub use output_formatter::{OutputFormat, OutputFormatter};
pub use replacer::{PassMode, PassReport, Replacer};
