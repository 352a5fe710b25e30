//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "feedercam";

/// Default number of ranked predictions kept per frame.
pub const DEFAULT_TOP_K: usize = 1;

/// Default confidence threshold for a detection to count at all.
pub const DEFAULT_THRESHOLD: f32 = 0.4;

/// Default minimum interval between logged visits of the same species, in seconds.
pub const DEFAULT_VISIT_INTERVAL_SECS: u64 = 2;

/// Default consensus sampling interval, in seconds.
///
/// Every interval the most frequent species seen is resolved and handed to
/// the lighting reactor.
pub const DEFAULT_CONSENSUS_INTERVAL_SECS: u64 = 3;

/// Default classifier input width in pixels.
pub const DEFAULT_INPUT_WIDTH: u32 = 224;

/// Default classifier input height in pixels.
pub const DEFAULT_INPUT_HEIGHT: u32 = 224;

/// Default poll interval when following a frame directory, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// File name of the persisted visit log inside the storage directory.
pub const VISIT_LOG_FILENAME: &str = "visits.csv";

/// Extension used for saved frame artifacts.
pub const ARTIFACT_EXTENSION: &str = "png";

/// Artifact tag used for training-mode captures.
pub const TRAINING_TAG: &str = "training";

/// Timestamp format for visit records, kept compatible with earlier logs.
pub const VISIT_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Confidence value bounds.
pub mod confidence {
    /// Minimum valid confidence value.
    pub const MIN: f32 = 0.0;
    /// Maximum valid confidence value.
    pub const MAX: f32 = 1.0;
}

/// Philips Hue constants.
pub mod hue {
    use std::time::Duration;

    /// HTTP timeout for bridge requests. Kept short so a dead bridge cannot
    /// stall a consensus tick for long.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

    /// Default scene transition time in deciseconds (Hue API unit).
    pub const DEFAULT_TRANSITION_DS: u16 = 40;
}

/// Species labels treated as non-detections by default.
///
/// `background` is the model's catch-all class; the other entries are known
/// false positives for a typical feeder camera.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "background",
    "Branta canadensis (Canada Goose)",
    "Cyanocitta stelleri (Steller's Jay)",
];
