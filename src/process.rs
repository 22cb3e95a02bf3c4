//! Album processor
//!
//! Ties the pieces together for one run:
//! - Validating source and destination
//! - Creating (and on an empty album removing) the album directory
//! - Consuming the transfer plan and copying every file

use crate::config::Config;
use crate::error::{Error, Result};
use crate::naming::album_dir_name;
use crate::plan::{CopyEntry, Planner};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span, warn};

/// Result of processing a single file
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Source file path
    pub source: PathBuf,
    /// Destination file path
    pub destination: PathBuf,
    /// Processing status
    pub status: ProcessingStatus,
    /// Error message (if failed)
    pub error: Option<String>,
}

/// Status of file processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    /// File was copied
    Success,
    /// Copy failed
    Failed,
    /// Dry run - would have copied
    DryRun,
}

/// Outcome of a run
#[derive(Debug)]
pub enum RunOutcome {
    /// The plan was carried out; per-file results in plan order
    Completed(Vec<FileResult>),
    /// No audio files in the source; nothing was left behind at the destination
    EmptyAlbum,
}

/// Processing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub total_files: usize,
    pub copied: usize,
    pub failed: usize,
    pub planned: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> String {
        format!(
            "Total: {}, Copied: {}, Failed: {}, Planned: {}",
            self.total_files, self.copied, self.failed, self.planned
        )
    }

    fn record(&mut self, status: ProcessingStatus) {
        match status {
            ProcessingStatus::Success => self.copied += 1,
            ProcessingStatus::Failed => self.failed += 1,
            ProcessingStatus::DryRun => self.planned += 1,
        }
    }
}

/// Copies one album according to a [`Config`]
pub struct Processor {
    config: Config,
    stats: ProcessingStats,
}

impl Processor {
    /// Create a new processor with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        if config.source_dir.as_os_str().is_empty() {
            return Err(Error::Config("source directory is not set".into()));
        }
        if config.dest_dir.as_os_str().is_empty() {
            return Err(Error::Config("destination directory is not set".into()));
        }
        Ok(Self {
            config,
            stats: ProcessingStats::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Directory the files end up in
    pub fn album_dir(&self) -> PathBuf {
        if self.config.drop_dst {
            self.config.dest_dir.clone()
        } else {
            self.config.dest_dir.join(album_dir_name(&self.config))
        }
    }

    /// Run the whole copy
    pub fn run(&mut self) -> Result<RunOutcome> {
        let _span = span!(Level::INFO, "processor_run").entered();

        let album = self.album_dir();
        self.validate(&album)?;

        let create_album = !self.config.drop_dst && !self.config.dry_run;
        if create_album {
            fs::create_dir(&album)?;
            debug!(?album, "Created album directory");
        }

        let planner = Planner::new(self.config.scanner(), self.config.layout())
            .with_unified_name(self.config.unified_name().map(str::to_string));

        let plan = match planner.plan(&self.config.source_dir, &album, !self.config.dry_run) {
            Ok(plan) => plan,
            Err(Error::EmptyAlbum { path }) => {
                warn!(?path, "No audio files found");
                if create_album {
                    fs::remove_dir(&album)?;
                    debug!(?album, "Removed empty album directory");
                }
                return Ok(RunOutcome::EmptyAlbum);
            }
            Err(e) => return Err(e),
        };

        self.stats.total_files = plan.total();
        info!(
            count = plan.total(),
            album = %album.display(),
            "Copying audio files"
        );

        let mut results = Vec::with_capacity(plan.total());
        for entry in plan {
            let entry = entry?;
            let result = if self.config.dry_run {
                info!(
                    source = %entry.source.display(),
                    destination = %entry.destination.display(),
                    "Would copy"
                );
                FileResult {
                    source: entry.source,
                    destination: entry.destination,
                    status: ProcessingStatus::DryRun,
                    error: None,
                }
            } else {
                process_single_file(entry)
            };
            self.stats.record(result.status);
            results.push(result);
        }

        info!("{}", self.stats.summary());
        Ok(RunOutcome::Completed(results))
    }

    fn validate(&self, album: &Path) -> Result<()> {
        let source = &self.config.source_dir;
        if !source.is_dir() {
            return Err(Error::unreadable(
                source,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }
        if !self.config.dest_dir.is_dir() {
            return Err(Error::InvalidPath {
                path: self.config.dest_dir.clone(),
            });
        }
        if !self.config.drop_dst && album.exists() {
            return Err(Error::DestinationExists {
                path: album.to_path_buf(),
            });
        }

        // Copying into the tree being walked would feed the plan its own output
        let source = source.canonicalize()?;
        let target = if album.exists() {
            album.canonicalize()?
        } else {
            self.config.dest_dir.canonicalize()?.join(album.file_name().unwrap_or_default())
        };
        if target.starts_with(&source) {
            return Err(Error::Config(format!(
                "destination {} is inside source {}",
                target.display(),
                source.display()
            )));
        }
        Ok(())
    }
}

/// Copy one planned file, turning failures into a failed result
fn process_single_file(entry: CopyEntry) -> FileResult {
    let _file_span = span!(Level::DEBUG, "process_file", source = ?entry.source).entered();

    match copy_entry(&entry) {
        Ok(()) => {
            debug!(destination = ?entry.destination, "Copied");
            FileResult {
                source: entry.source,
                destination: entry.destination,
                status: ProcessingStatus::Success,
                error: None,
            }
        }
        Err(e) => {
            error!(error = %e, "Copy failed");
            FileResult {
                source: entry.source,
                destination: entry.destination,
                status: ProcessingStatus::Failed,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Copy the file and carry over its modification time
///
/// Never overwrites: an existing destination is an error.
fn copy_entry(entry: &CopyEntry) -> Result<()> {
    copy_file(&entry.source, &entry.destination)?;

    // Timestamp failures are logged only; the copy still counts
    if let Err(e) = preserve_mtime(&entry.source, &entry.destination) {
        warn!(destination = ?entry.destination, error = %e, "Could not preserve modification time");
    }
    Ok(())
}

/// Give `dest` the modification time of `source`
fn preserve_mtime(source: &Path, dest: &Path) -> Result<()> {
    let mtime = fs::metadata(source)?.modified()?;
    filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime))?;
    Ok(())
}

/// Copy file with buffered I/O for efficiency
fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    let src_file = File::open(source)?;
    let dest_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => Error::DestinationExists {
                path: dest.to_path_buf(),
            },
            _ => Error::Io(e),
        })?;

    let mut reader = BufReader::with_capacity(256 * 1024, src_file);
    let mut writer = BufWriter::with_capacity(256 * 1024, dest_file);

    let mut buffer = vec![0u8; 256 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn touch(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn config(src: &Path, dst: &Path) -> Config {
        Config {
            source_dir: src.to_path_buf(),
            dest_dir: dst.to_path_buf(),
            ..Config::default()
        }
    }

    fn completed(outcome: RunOutcome) -> Vec<FileResult> {
        match outcome {
            RunOutcome::Completed(results) => results,
            RunOutcome::EmptyAlbum => panic!("expected a completed run"),
        }
    }

    #[test]
    fn test_processing_stats() {
        let mut stats = ProcessingStats::new();
        stats.total_files = 4;
        stats.record(ProcessingStatus::Success);
        stats.record(ProcessingStatus::Success);
        stats.record(ProcessingStatus::Failed);
        stats.record(ProcessingStatus::DryRun);

        let summary = stats.summary();
        assert!(summary.contains("Total: 4"));
        assert!(summary.contains("Copied: 2"));
        assert!(summary.contains("Failed: 1"));
        assert!(summary.contains("Planned: 1"));
    }

    #[test]
    fn test_new_requires_directories() {
        assert!(matches!(
            Processor::new(Config::default()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_flat_copy() {
        let root = tempdir().unwrap();
        let src = root.path().join("Blue Train");
        let dst = root.path().join("player");
        fs::create_dir(&dst).unwrap();
        touch(&src.join("A/1.mp3"), b"one");
        touch(&src.join("A/2.mp3"), b"two");
        touch(&src.join("B/3.mp3"), b"three");
        touch(&src.join("B/cover.jpg"), b"jpg");

        let mut processor = Processor::new(config(&src, &dst)).unwrap();
        let results = completed(processor.run().unwrap());

        let album = dst.join("Blue Train");
        assert_eq!(processor.album_dir(), album);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.status == ProcessingStatus::Success));
        assert_eq!(fs::read(album.join("1-1.mp3")).unwrap(), b"one");
        assert_eq!(fs::read(album.join("2-2.mp3")).unwrap(), b"two");
        assert_eq!(fs::read(album.join("3-3.mp3")).unwrap(), b"three");
        assert_eq!(fs::read_dir(&album).unwrap().count(), 3);
        assert_eq!(processor.stats().copied, 3);
    }

    #[test]
    fn test_tree_copy_with_album_name() {
        let root = tempdir().unwrap();
        let src = root.path().join("rip");
        let dst = root.path().join("player");
        fs::create_dir(&dst).unwrap();
        touch(&src.join("CD 1/01 So What.flac"), b"a");
        touch(&src.join("CD 2/01 Freddie.flac"), b"b");

        let mut cfg = config(&src, &dst);
        cfg.tree_dst = true;
        cfg.artist = Some("Miles Davis".into());
        cfg.album = Some("Kind of Blue".into());
        cfg.album_num = Some("7".into());

        let mut processor = Processor::new(cfg).unwrap();
        completed(processor.run().unwrap());

        let album = dst.join("07-Miles Davis - Kind of Blue");
        assert!(album.join("000-CD 1/0-01 So What.flac").is_file());
        assert!(album.join("001-CD 2/0-01 Freddie.flac").is_file());
    }

    #[test]
    fn test_destination_exists() {
        let root = tempdir().unwrap();
        let src = root.path().join("Album");
        let dst = root.path().join("player");
        touch(&src.join("1.mp3"), b"x");
        fs::create_dir_all(dst.join("Album")).unwrap();

        let mut processor = Processor::new(config(&src, &dst)).unwrap();
        let err = processor.run().unwrap_err();
        assert!(matches!(err, Error::DestinationExists { .. }));
    }

    #[test]
    fn test_empty_album_removes_directory() {
        let root = tempdir().unwrap();
        let src = root.path().join("Album");
        let dst = root.path().join("player");
        fs::create_dir(&dst).unwrap();
        touch(&src.join("cover.jpg"), b"x");

        let mut processor = Processor::new(config(&src, &dst)).unwrap();
        assert!(matches!(processor.run().unwrap(), RunOutcome::EmptyAlbum));
        assert!(!dst.join("Album").exists());
    }

    #[test]
    fn test_drop_dst_copies_into_destination() {
        let root = tempdir().unwrap();
        let src = root.path().join("Album");
        let dst = root.path().join("player");
        fs::create_dir(&dst).unwrap();
        touch(&src.join("song.ogg"), b"x");

        let mut cfg = config(&src, &dst);
        cfg.drop_dst = true;
        cfg.unified_name = Some("Podcast".into());

        let mut processor = Processor::new(cfg).unwrap();
        completed(processor.run().unwrap());
        assert!(dst.join("1-Podcast.ogg").is_file());
    }

    #[test]
    fn test_existing_file_fails_but_run_continues() {
        let root = tempdir().unwrap();
        let src = root.path().join("Album");
        let dst = root.path().join("player");
        touch(&src.join("1.mp3"), b"new");
        touch(&src.join("2.mp3"), b"new");
        touch(&dst.join("1-1.mp3"), b"old");

        let mut cfg = config(&src, &dst);
        cfg.drop_dst = true;

        let mut processor = Processor::new(cfg).unwrap();
        let results = completed(processor.run().unwrap());

        assert_eq!(results[0].status, ProcessingStatus::Failed);
        assert!(results[0].error.is_some());
        assert_eq!(results[1].status, ProcessingStatus::Success);
        assert_eq!(fs::read(dst.join("1-1.mp3")).unwrap(), b"old");
        assert_eq!(processor.stats().failed, 1);
        assert_eq!(processor.stats().copied, 1);
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let root = tempdir().unwrap();
        let src = root.path().join("Album");
        let dst = root.path().join("player");
        fs::create_dir(&dst).unwrap();
        touch(&src.join("CD 1/1.mp3"), b"x");

        let mut cfg = config(&src, &dst);
        cfg.dry_run = true;
        cfg.tree_dst = true;

        let mut processor = Processor::new(cfg).unwrap();
        let results = completed(processor.run().unwrap());

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ProcessingStatus::DryRun);
        assert_eq!(
            results[0].destination,
            dst.join("Album").join("000-CD 1").join("0-1.mp3")
        );
        assert!(!dst.join("Album").exists());
        assert_eq!(processor.stats().planned, 1);
    }

    #[test]
    fn test_destination_inside_source_rejected() {
        let root = tempdir().unwrap();
        let src = root.path().join("Album");
        touch(&src.join("1.mp3"), b"x");

        let mut processor = Processor::new(config(&src, &src)).unwrap();
        assert!(matches!(processor.run().unwrap_err(), Error::Config(_)));
    }

    #[test]
    fn test_missing_source() {
        let root = tempdir().unwrap();
        let mut processor =
            Processor::new(config(&root.path().join("nope"), root.path())).unwrap();
        assert!(matches!(
            processor.run().unwrap_err(),
            Error::SourceUnreadable { .. }
        ));
    }

    #[test]
    fn test_preserve_mtime_reports_failure() {
        let root = tempdir().unwrap();
        let source = root.path().join("in.mp3");
        touch(&source, b"x");

        let err = preserve_mtime(&source, &root.path().join("gone.mp3")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(preserve_mtime(&root.path().join("missing.mp3"), &source).is_err());
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let root = tempdir().unwrap();
        let source = root.path().join("in.mp3");
        let destination = root.path().join("out.mp3");
        touch(&source, b"payload");

        let past = SystemTime::now() - Duration::from_secs(86_400);
        filetime::set_file_mtime(&source, filetime::FileTime::from_system_time(past)).unwrap();

        copy_entry(&CopyEntry {
            source: source.clone(),
            destination: destination.clone(),
            index: 1,
        })
        .unwrap();

        assert_eq!(fs::read(&destination).unwrap(), b"payload");
        let src_mtime = fs::metadata(&source).unwrap().modified().unwrap();
        let dst_mtime = fs::metadata(&destination).unwrap().modified().unwrap();
        assert_eq!(src_mtime, dst_mtime);
    }
}
