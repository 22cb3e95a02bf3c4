//! Classification of source tree entries
//!
//! Every entry found while walking the source tree is either a directory,
//! an audio file we know how to handle, or something to skip.

use std::path::{Path, PathBuf};

/// Audio formats accepted when no single file type is requested
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3", "m4a", "m4b", "ogg", "wma", "flac"];

/// Kind of a source tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Directory,
    /// A file whose extension is on the allow-list
    Audio,
    Ignored,
}

/// Decides what each path in the source tree is
#[derive(Debug, Clone)]
pub struct Classifier {
    /// Normalized (no dots, upper case) allowed extensions
    extensions: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().copied())
    }
}

impl Classifier {
    /// Create a classifier accepting the given extensions
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Create a classifier that accepts exactly one file type
    pub fn single(extension: &str) -> Self {
        Self::new([extension])
    }

    /// Classify a path, following symlinks for the directory check
    pub fn classify(&self, path: &Path) -> PathKind {
        if path.is_dir() {
            PathKind::Directory
        } else if self.is_audio(path) {
            PathKind::Audio
        } else {
            PathKind::Ignored
        }
    }

    /// Check the extension against the allow-list without touching the filesystem
    pub fn is_audio(&self, path: &Path) -> bool {
        self.extensions.iter().any(|ext| has_extension(path, ext))
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_matches('.').to_uppercase()
}

/// Check whether a path has the given extension, ignoring case and leading dots
pub fn has_extension(path: &Path, ext: &str) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(actual) => normalize_extension(actual) == normalize_extension(ext),
        None => false,
    }
}

/// Path with its final extension removed
pub fn strip_extension(path: &Path) -> PathBuf {
    match (path.parent(), path.file_stem()) {
        (Some(parent), Some(stem)) => parent.join(stem),
        (None, Some(stem)) => PathBuf::from(stem),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_strip_extension() {
        assert_eq!(
            strip_extension(Path::new("/alfa/bravo/charlie.dat")),
            PathBuf::from("/alfa/bravo/charlie")
        );
        assert_eq!(
            strip_extension(Path::new("/alfa/bravo/charlie")),
            PathBuf::from("/alfa/bravo/charlie")
        );
        assert_eq!(
            strip_extension(Path::new("/alfa/bravo/charlie/")),
            PathBuf::from("/alfa/bravo/charlie")
        );
        assert_eq!(
            strip_extension(Path::new("/alfa/bra.vo/charlie.dat")),
            PathBuf::from("/alfa/bra.vo/charlie")
        );
        assert_eq!(strip_extension(Path::new("song.mp3")), PathBuf::from("song"));
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("/alfa/bra.vo/charlie.ogg"), "OGG"));
        assert!(has_extension(Path::new("/alfa/bra.vo/charlie.ogg"), ".ogg"));
        assert!(!has_extension(Path::new("/alfa/bra.vo/charlie.ogg"), "mp3"));
        assert!(!has_extension(Path::new("/alfa/bra.vo/charlie"), "vo"));
    }

    #[test]
    fn test_default_allow_list() {
        let classifier = Classifier::default();
        for name in ["a.mp3", "b.M4A", "c.m4b", "d.Ogg", "e.wma", "f.FLAC"] {
            assert!(classifier.is_audio(Path::new(name)), "{name} should be audio");
        }
        assert!(!classifier.is_audio(Path::new("cover.jpg")));
        assert!(!classifier.is_audio(Path::new("notes")));
    }

    #[test]
    fn test_single_file_type() {
        let classifier = Classifier::single(".flac");
        assert!(classifier.is_audio(Path::new("track.FLAC")));
        assert!(!classifier.is_audio(Path::new("track.mp3")));
    }

    #[test]
    fn test_classify_on_disk() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("Disc 1");
        fs::create_dir(&sub).unwrap();
        let song = dir.path().join("01.mp3");
        fs::write(&song, b"x").unwrap();
        let cover = dir.path().join("cover.jpg");
        fs::write(&cover, b"x").unwrap();
        // A directory named like an audio file is still a directory
        let tricky = dir.path().join("bonus.mp3");
        fs::create_dir(&tricky).unwrap();

        let classifier = Classifier::default();
        assert_eq!(classifier.classify(&sub), PathKind::Directory);
        assert_eq!(classifier.classify(&song), PathKind::Audio);
        assert_eq!(classifier.classify(&cover), PathKind::Ignored);
        assert_eq!(classifier.classify(&tricky), PathKind::Directory);

        // Same input, same answer
        assert_eq!(classifier.classify(&song), classifier.classify(&song));
    }
}
