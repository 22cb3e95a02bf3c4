//! Configuration types for the album sorter

use crate::classify::{Classifier, DEFAULT_EXTENSIONS};
use crate::plan::Layout;
use crate::scan::{Scanner, SortOrder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the album sorter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source album directory
    pub source_dir: PathBuf,

    /// Destination directory; the album directory is created inside it
    pub dest_dir: PathBuf,

    /// How names are compared when sorting
    pub sort: SortOrder,

    /// Number files from the highest index down (flat layout only)
    pub reverse: bool,

    /// Mirror the source directory structure instead of flattening it
    pub tree_dst: bool,

    /// Copy straight into the destination, without an album directory
    pub drop_dst: bool,

    /// Replace every file's stem with this name
    pub unified_name: Option<String>,

    /// Album number, prepended to the album directory name
    pub album_num: Option<String>,

    /// Artist name, used for the album directory name
    pub artist: Option<String>,

    /// Album title, used for the album directory name
    pub album: Option<String>,

    /// Accept only this file type (e.g. "mp3") instead of the default list
    pub file_type: Option<String>,

    /// Accepted audio extensions when no file type is given
    pub extensions: Vec<String>,

    /// Dry run mode - plan only, don't create or copy anything
    pub dry_run: bool,

    /// Verbose output
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            dest_dir: PathBuf::new(),
            sort: SortOrder::default(),
            reverse: false,
            tree_dst: false,
            drop_dst: false,
            unified_name: None,
            album_num: None,
            artist: None,
            album: None,
            file_type: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            dry_run: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Destination layout selected by the flags
    ///
    /// Tree mode wins over reverse; reverse numbering only exists for flat output.
    pub fn layout(&self) -> Layout {
        if self.tree_dst {
            Layout::Tree
        } else if self.reverse {
            Layout::FlatReverse
        } else {
            Layout::FlatForward
        }
    }

    /// Classifier for the configured file types
    pub fn classifier(&self) -> Classifier {
        match self.file_type.as_deref().map(str::trim) {
            Some(ext) if !ext.is_empty() => Classifier::single(ext),
            _ => Classifier::new(&self.extensions),
        }
    }

    /// Scanner using the configured classifier and sort order
    pub fn scanner(&self) -> Scanner {
        Scanner::new(self.classifier(), self.sort)
    }

    /// Unified name, if set and not blank
    pub fn unified_name(&self) -> Option<&str> {
        self.unified_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            source: e,
        })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Album Sorter Configuration File
# This file uses TOML format (https://toml.io)

# Source album directory
source_dir = "/music/rips/Blue Train"

# Destination directory (the album directory is created inside it)
dest_dir = "/media/player/MUSIC"

# Sort order: "natural" or "lexicographic"
# - natural: "2 Intro" comes before "10 Outro"
# - lexicographic: plain string order
sort = "natural"

# Number files from the highest index down (flat layout only)
reverse = false

# Mirror the source directory structure (000-CD 1/01-track.mp3)
tree_dst = false

# Copy straight into dest_dir without creating an album directory
drop_dst = false

# Replace every file name with this one, keeping prefix and extension
# unified_name = "Blue Train"

# Album number, prepended to the album directory name as "NN-"
# album_num = "1"

# Artist and album; when both are set the album directory is "Artist - Album"
# artist = "John Coltrane"
# album = "Blue Train"

# Accept only one file type instead of the list below
# file_type = "mp3"

# Accepted audio extensions
extensions = ["mp3", "m4a", "m4b", "ogg", "wma", "flac"]

# Dry run mode - show what would be done without doing it
dry_run = false

# Verbose output - show detailed processing information
verbose = false
"#
        .to_string()
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError { source: toml::ser::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}
