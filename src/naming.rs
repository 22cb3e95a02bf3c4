//! Destination name decoration
//!
//! Every copied file gets a zero-padded numeric prefix; in tree mode
//! directories get a three-digit one. The album directory itself is
//! named from the artist/album settings or the source directory.

use crate::config::Config;
use std::path::Path;

/// Width of the prefix put in front of directory names in tree mode
pub const DIR_PREFIX_WIDTH: usize = 3;

/// Format `n` left-padded with zeros to at least `width` digits
pub fn zero_pad(width: usize, n: usize) -> String {
    format!("{:0width$}", n, width = width)
}

/// Build the destination file name for the `index`-th file
///
/// With a unified name the original stem is replaced and only the
/// extension survives.
pub fn decorate_file_name(
    width: usize,
    index: usize,
    original: &str,
    unified: Option<&str>,
) -> String {
    let prefix = zero_pad(width, index);
    match unified {
        Some(base) => match Path::new(original).extension() {
            Some(ext) => format!("{}-{}.{}", prefix, base, ext.to_string_lossy()),
            None => format!("{}-{}", prefix, base),
        },
        None => format!("{}-{}", prefix, original),
    }
}

/// Build the destination directory name for the `index`-th subdirectory
pub fn decorate_dir_name(index: usize, original: &str) -> String {
    format!("{}-{}", zero_pad(DIR_PREFIX_WIDTH, index), original)
}

/// Name of the album directory created under the destination
///
/// `"Artist - Album"` when both are known, otherwise the source directory
/// name. An album number becomes a two-digit `NN-` prefix; non-numeric
/// values are used as given.
pub fn album_dir_name(config: &Config) -> String {
    let base = match (&config.artist, &config.album) {
        (Some(artist), Some(album)) => format!("{} - {}", artist, album),
        _ => config
            .source_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "album".to_string()),
    };

    match config.album_num.as_deref().map(str::trim) {
        Some(num) if !num.is_empty() => match num.parse::<usize>() {
            Ok(n) => format!("{}-{}", zero_pad(2, n), base),
            Err(_) => format!("{}-{}", num, base),
        },
        _ => base,
    }
}
