//! Album Sorter - renumber audio albums for simple players
//!
//! This library copies the audio files of a source tree into a
//! destination with sequential, zero-padded name prefixes:
//! - Natural ordering of names with embedded numbers
//! - Flat output numbered forward or in reverse
//! - Tree output mirroring the source structure
//! - Unified file names and album directory naming
//! - A lazy transfer plan consumed by the file copier

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod naming;
pub mod natural;
pub mod plan;
pub mod process;
pub mod scan;

pub use classify::{Classifier, PathKind};
pub use cli::Cli;
pub use config::{Config, ConfigError};
pub use error::{Error, Result};
pub use plan::{CopyEntry, Layout, Plan, Planner};
pub use process::{Processor, RunOutcome};
pub use scan::{Scanner, SortOrder};
