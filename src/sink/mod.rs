//! Event persistence.
//!
//! Persistence is fire-and-forget from the frame loop's point of view: events
//! are queued to a worker thread so a slow disk or log write never delays the
//! next frame. Sink failures are logged by the worker and never fed back —
//! a visit stays logged in the in-memory window even if its artifact failed
//! to save.

mod storage;

pub use storage::{FileStore, VisitRecord};

use crate::error::Result;
use crate::monitor::VisitEvent;
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use tracing::warn;

/// Persists visit records and frame artifacts.
pub trait EventSink {
    /// Append one visit record.
    fn record_visit(&mut self, event: &VisitEvent) -> Result<()>;

    /// Save a frame artifact, returning its path.
    fn save_artifact(&mut self, image: &DynamicImage, tag: &str) -> Result<PathBuf>;
}

/// Work items handed to the sink worker.
pub enum SinkMessage {
    /// A new visit with the frame that opened it.
    Visit {
        /// The visit event to record.
        event: VisitEvent,
        /// The camera frame to save as an artifact.
        image: DynamicImage,
    },
    /// A training-mode capture.
    TrainingCapture {
        /// The camera frame to save.
        image: DynamicImage,
        /// Artifact tag.
        tag: String,
    },
}

/// Handle for queueing work to the sink worker.
#[derive(Clone)]
pub struct SinkHandle {
    tx: mpsc::Sender<SinkMessage>,
}

impl SinkHandle {
    /// Queue a message; a dead worker is logged, not propagated.
    pub fn send(&self, message: SinkMessage) {
        if self.tx.send(message).is_err() {
            warn!("Sink worker is gone, dropping event");
        }
    }
}

/// Spawn the sink worker thread and return a handle for queueing work.
///
/// The worker drains messages until every handle is dropped. Each failure is
/// logged and the worker moves on; persistence errors are recoverable by
/// design.
pub fn spawn_sink_worker(mut sink: Box<dyn EventSink + Send>) -> Result<SinkHandle> {
    let (tx, rx) = mpsc::channel::<SinkMessage>();

    thread::Builder::new()
        .name("sink-worker".to_string())
        .spawn(move || {
            while let Ok(message) = rx.recv() {
                match message {
                    SinkMessage::Visit { event, image } => {
                        if let Err(e) = sink.record_visit(&event) {
                            warn!("Failed to record visit for {}: {e}", event.species);
                        }
                        if let Err(e) = sink.save_artifact(&image, &event.species) {
                            warn!("Failed to save visit artifact: {e}");
                        }
                    }
                    SinkMessage::TrainingCapture { image, tag } => {
                        if let Err(e) = sink.save_artifact(&image, &tag) {
                            warn!("Failed to save training capture: {e}");
                        }
                    }
                }
            }
        })
        .map_err(|e| crate::error::Error::Internal {
            message: format!("failed to spawn sink worker: {e}"),
        })?;

    Ok(SinkHandle { tx })
}
