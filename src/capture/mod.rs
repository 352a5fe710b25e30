//! Camera frame sources.
//!
//! Video decoding itself is an external concern: camera software (motion,
//! raspistill, an RTSP snapshotter) drops still frames into a directory and
//! this module reads them back in order. `follow` mode keeps polling the
//! directory so the monitor runs indefinitely against a live camera.

use crate::error::{Error, Result};
use image::DynamicImage;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// A sequential source of camera frames.
///
/// `next_frame` blocks until a frame is available and returns `None` when the
/// source is exhausted. Frames that fail to decode are skipped with a
/// warning; a corrupt file must not stop the monitor.
pub trait FrameSource {
    /// Fetch the next frame, or `None` if the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<DynamicImage>>;
}

/// Frame source reading image files from a directory.
///
/// Existing files are yielded in name order. In follow mode the directory is
/// re-scanned after the backlog drains and newly appeared files are yielded
/// as they arrive.
pub struct DirectorySource {
    dir: PathBuf,
    pending: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
    follow: bool,
    poll_interval: Duration,
}

impl DirectorySource {
    /// Open a directory as a frame source.
    pub fn open(dir: &Path, follow: bool, poll_interval: Duration) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::SourceNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut source = Self {
            dir: dir.to_path_buf(),
            pending: Vec::new(),
            seen: HashSet::new(),
            follow,
            poll_interval,
        };
        source.scan()?;
        Ok(source)
    }

    /// Scan the directory for image files not yet yielded.
    fn scan(&mut self) -> Result<()> {
        let mut fresh = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && is_image_file(&path) && !self.seen.contains(&path) {
                fresh.push(path);
            }
        }
        // Name order approximates capture order for timestamped filenames.
        fresh.sort();
        for path in &fresh {
            self.seen.insert(path.clone());
        }
        // Consumed from the back.
        fresh.reverse();
        self.pending.splice(0..0, fresh);
        Ok(())
    }
}

impl FrameSource for DirectorySource {
    fn next_frame(&mut self) -> Result<Option<DynamicImage>> {
        loop {
            if let Some(path) = self.pending.pop() {
                match image::open(&path) {
                    Ok(frame) => {
                        debug!("Frame: {}", path.display());
                        return Ok(Some(frame));
                    }
                    Err(e) => {
                        warn!("Skipping undecodable frame {}: {}", path.display(), e);
                        continue;
                    }
                }
            }

            if !self.follow {
                return Ok(None);
            }

            std::thread::sleep(self.poll_interval);
            self.scan()?;
        }
    }
}

/// Check if a file is a supported image format.
fn is_image_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        ext.eq_ignore_ascii_case(OsStr::new("jpg"))
            || ext.eq_ignore_ascii_case(OsStr::new("jpeg"))
            || ext.eq_ignore_ascii_case(OsStr::new("png"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn write_frame(dir: &Path, name: &str) {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(4, 4);
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("frame.jpg")));
        assert!(is_image_file(Path::new("frame.PNG")));
        assert!(!is_image_file(Path::new("frame.txt")));
        assert!(!is_image_file(Path::new("frame")));
    }

    #[test]
    fn test_open_missing_directory() {
        let result = DirectorySource::open(
            Path::new("/nonexistent/frames"),
            false,
            Duration::from_millis(10),
        );
        assert!(matches!(result, Err(Error::SourceNotFound { .. })));
    }

    #[test]
    fn test_yields_frames_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "b.png");
        write_frame(dir.path(), "a.png");
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let mut source =
            DirectorySource::open(dir.path(), false, Duration::from_millis(10)).unwrap();
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_skips_undecodable_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("corrupt.jpg"), b"not an image").unwrap();
        write_frame(dir.path(), "ok.png");

        let mut source =
            DirectorySource::open(dir.path(), false, Duration::from_millis(10)).unwrap();
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_follow_picks_up_new_frames() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), "first.png");

        let mut source = DirectorySource::open(dir.path(), true, Duration::from_millis(5)).unwrap();
        assert!(source.next_frame().unwrap().is_some());

        write_frame(dir.path(), "second.png");
        assert!(source.next_frame().unwrap().is_some());
    }
}
