//! CLI argument parsing with clap

use crate::config::Config;
use crate::scan::SortOrder;
use clap::Parser;
use std::path::PathBuf;

/// Album Sorter - renumber audio albums for simple players
///
/// Copies the audio files of an album into a destination directory with
/// sequential, zero-padded prefixes, so players that sort file names
/// lexicographically play them in natural order.
#[derive(Parser, Debug)]
#[command(name = "album-sorter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Source album directory
    #[arg(value_name = "SRC_DIR")]
    pub src_dir: Option<PathBuf>,

    /// Destination directory
    #[arg(value_name = "DST_DIR")]
    pub dst_dir: Option<PathBuf>,

    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Sort names lexicographically instead of naturally
    #[arg(short = 'x', long)]
    pub sort_lex: bool,

    /// Number files in reverse order (highest index first)
    #[arg(short, long, conflicts_with = "tree_dst")]
    pub reverse: bool,

    /// Keep the source tree structure at the destination
    #[arg(short, long)]
    pub tree_dst: bool,

    /// Do not create an album directory, copy straight into DST_DIR
    #[arg(short = 'p', long)]
    pub drop_dst: bool,

    /// Give every file the same name, keeping only prefix and extension
    #[arg(short, long, value_name = "NAME")]
    pub unified_name: Option<String>,

    /// Album number, prepended to the album directory name
    #[arg(short = 'b', long, value_name = "NUM")]
    pub album_num: Option<String>,

    /// Artist name, used with --album to name the album directory
    #[arg(short, long)]
    pub artist: Option<String>,

    /// Album title, used with --artist to name the album directory
    #[arg(short = 'g', long)]
    pub album: Option<String>,

    /// Accept only this file type (e.g. mp3, .ogg)
    #[arg(short = 'e', long, value_name = "EXT")]
    pub file_type: Option<String>,

    /// Dry run mode - show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub print_config: bool,

    /// Write the effective configuration to a TOML file and exit
    #[arg(long, value_name = "PATH")]
    pub save_config: Option<PathBuf>,
}

impl Cli {
    /// Get config file name (without extension) for log naming
    pub fn config_name(&self) -> Option<String> {
        self.config.as_ref().and_then(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref src) = self.src_dir {
            config.source_dir = src.clone();
        }
        if let Some(ref dst) = self.dst_dir {
            config.dest_dir = dst.clone();
        }
        if self.sort_lex {
            config.sort = SortOrder::Lexicographic;
        }
        if self.reverse {
            config.reverse = true;
        }
        if self.tree_dst {
            config.tree_dst = true;
        }
        if self.drop_dst {
            config.drop_dst = true;
        }
        if let Some(ref name) = self.unified_name {
            config.unified_name = Some(name.clone());
        }
        if let Some(ref num) = self.album_num {
            config.album_num = Some(num.clone());
        }
        if let Some(ref artist) = self.artist {
            config.artist = Some(artist.clone());
        }
        if let Some(ref album) = self.album {
            config.album = Some(album.clone());
        }
        if let Some(ref file_type) = self.file_type {
            config.file_type = Some(file_type.clone());
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Layout;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "album-sorter", "-x", "-r", "-u", "Show", "-b", "3", "-e", "ogg", "/src", "/dst",
        ])
        .unwrap();
        let config = cli.to_config();

        assert_eq!(config.source_dir, PathBuf::from("/src"));
        assert_eq!(config.dest_dir, PathBuf::from("/dst"));
        assert_eq!(config.sort, SortOrder::Lexicographic);
        assert_eq!(config.layout(), Layout::FlatReverse);
        assert_eq!(config.unified_name.as_deref(), Some("Show"));
        assert_eq!(config.album_num.as_deref(), Some("3"));
        assert_eq!(config.file_type.as_deref(), Some("ogg"));
    }

    #[test]
    fn test_reverse_conflicts_with_tree() {
        assert!(Cli::try_parse_from(["album-sorter", "-r", "-t", "/src", "/dst"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let file_config = Config {
            source_dir: PathBuf::from("/from-file"),
            dest_dir: PathBuf::from("/dst-file"),
            artist: Some("File Artist".into()),
            ..Config::default()
        };
        let cli = Cli::try_parse_from(["album-sorter", "-t", "-a", "Cli Artist", "/src"]).unwrap();
        let config = cli.merge_with_config(file_config);

        assert_eq!(config.source_dir, PathBuf::from("/src"));
        assert_eq!(config.dest_dir, PathBuf::from("/dst-file"));
        assert_eq!(config.artist.as_deref(), Some("Cli Artist"));
        assert!(config.tree_dst);
    }

    #[test]
    fn test_save_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("album.toml");
        let cli = Cli::try_parse_from([
            "album-sorter",
            "-t",
            "-u",
            "Lecture",
            "--save-config",
            path.to_str().unwrap(),
            "/src",
            "/dst",
        ])
        .unwrap();
        assert_eq!(cli.save_config.as_deref(), Some(path.as_path()));

        cli.to_config().save_to_file(&path).unwrap();
        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.source_dir, PathBuf::from("/src"));
        assert_eq!(loaded.unified_name.as_deref(), Some("Lecture"));
        assert_eq!(loaded.layout(), Layout::Tree);
    }

    #[test]
    fn test_config_name() {
        let cli = Cli::try_parse_from(["album-sorter", "-C", "Config/podcasts.toml"]).unwrap();
        assert_eq!(cli.config_name().as_deref(), Some("podcasts"));
    }
}
