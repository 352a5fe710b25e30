//! File-backed event sink.
//!
//! Visits are appended to a CSV log in the storage directory; frame
//! artifacts are saved next to it as PNG files tagged with the species and a
//! monotonic millisecond counter, matching the `img-<tag>-<millis>.png`
//! naming of earlier captures.

use crate::constants::{ARTIFACT_EXTENSION, VISIT_LOG_FILENAME, VISIT_TIMESTAMP_FORMAT};
use crate::error::{Error, Result};
use crate::monitor::VisitEvent;
use crate::sink::EventSink;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// One persisted visit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRecord {
    /// Visit timestamp, formatted per [`VISIT_TIMESTAMP_FORMAT`].
    pub timestamp: String,
    /// Species label.
    pub species: String,
    /// Top-1 confidence of the visit's opening frame.
    pub confidence: f32,
}

/// Event sink writing to a local storage directory.
pub struct FileStore {
    storage_dir: PathBuf,
    log_path: PathBuf,
    started: Instant,
}

impl FileStore {
    /// Open a storage directory, creating it if needed.
    pub fn open(storage_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(storage_dir)?;
        Ok(Self {
            storage_dir: storage_dir.to_path_buf(),
            log_path: storage_dir.join(VISIT_LOG_FILENAME),
            started: Instant::now(),
        })
    }

    /// Path of the visit log.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Monotonic milliseconds since the store opened, for artifact names.
    fn monotonic_millis(&self) -> u128 {
        self.started.elapsed().as_millis()
    }
}

impl EventSink for FileStore {
    fn record_visit(&mut self, event: &VisitEvent) -> Result<()> {
        let write_header = !self.log_path.exists();

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| Error::VisitLogWrite {
                path: self.log_path.clone(),
                source: Box::new(e),
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);

        writer
            .serialize(VisitRecord {
                timestamp: event.timestamp.format(VISIT_TIMESTAMP_FORMAT).to_string(),
                species: event.species.clone(),
                confidence: event.confidence,
            })
            .and_then(|()| writer.flush().map_err(Into::into))
            .map_err(|e| Error::VisitLogWrite {
                path: self.log_path.clone(),
                source: Box::new(e),
            })?;

        info!(
            "Visit logged: {} ({:.2}) at {}",
            event.species, event.confidence, event.timestamp
        );
        Ok(())
    }

    fn save_artifact(&mut self, image: &DynamicImage, tag: &str) -> Result<PathBuf> {
        let name = format!(
            "img-{}-{:010}.{}",
            sanitize_tag(tag),
            self.monotonic_millis(),
            ARTIFACT_EXTENSION
        );
        let path = self.storage_dir.join(name);

        image.save(&path).map_err(|e| Error::ArtifactWrite {
            path: path.clone(),
            source: Box::new(e),
        })?;

        info!("Frame saved as: {}", path.display());
        Ok(path)
    }
}

/// Make a tag safe for use in a file name.
fn sanitize_tag(tag: &str) -> String {
    tag.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Local;
    use image::{ImageBuffer, Rgb};

    fn event(species: &str) -> VisitEvent {
        VisitEvent {
            species: species.to_string(),
            confidence: 0.9,
            timestamp: Local::now(),
        }
    }

    #[test]
    fn test_record_visit_appends_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        store.record_visit(&event("Cardinal")).unwrap();
        store.record_visit(&event("Blue Jay")).unwrap();

        let contents = std::fs::read_to_string(store.log_path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        // Header plus two records.
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("timestamp"));
        assert!(lines[1].contains("Cardinal"));
        assert!(lines[2].contains("Blue Jay"));
    }

    #[test]
    fn test_header_written_once_across_reopens() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            store.record_visit(&event("Cardinal")).unwrap();
        }
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            store.record_visit(&event("Cardinal")).unwrap();
        }

        let contents =
            std::fs::read_to_string(dir.path().join(VISIT_LOG_FILENAME)).unwrap();
        let headers = contents.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(headers, 1);
    }

    #[test]
    fn test_save_artifact_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(4, 4);

        let path = store
            .save_artifact(&DynamicImage::ImageRgb8(img), "Northern Cardinal")
            .unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("img-Northern_Cardinal-"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_sanitize_tag() {
        assert_eq!(sanitize_tag("Blue Jay"), "Blue_Jay");
        assert_eq!(sanitize_tag("a/b:c"), "a_b_c");
    }
}
