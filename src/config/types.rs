//! Configuration type definitions.

use crate::constants::{
    DEFAULT_CONSENSUS_INTERVAL_SECS, DEFAULT_EXCLUSIONS, DEFAULT_INPUT_HEIGHT, DEFAULT_INPUT_WIDTH,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_THRESHOLD, DEFAULT_TOP_K, DEFAULT_VISIT_INTERVAL_SECS, hue,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Classifier model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Frame capture settings.
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Detection filtering settings.
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Visit logging settings.
    #[serde(default)]
    pub visits: VisitsConfig,

    /// Consensus sampling settings.
    #[serde(default)]
    pub consensus: ConsensusConfig,

    /// Ambient lighting settings. None disables lighting reactions.
    #[serde(default)]
    pub lighting: Option<LightingConfig>,
}

/// Classifier model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX model file.
    pub path: Option<PathBuf>,

    /// Path to the labels file.
    pub labels: Option<PathBuf>,

    /// Model input width in pixels.
    pub input_width: u32,

    /// Model input height in pixels.
    pub input_height: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: None,
            labels: None,
            input_width: DEFAULT_INPUT_WIDTH,
            input_height: DEFAULT_INPUT_HEIGHT,
        }
    }
}

/// Frame capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Frame source: a directory that camera software drops image files into.
    pub source: Option<PathBuf>,

    /// Keep polling the source directory for new frames instead of stopping
    /// after the existing ones.
    pub follow: bool,

    /// Poll interval in milliseconds when following.
    pub poll_interval_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: None,
            follow: false,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// Detection filtering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Number of ranked predictions kept per frame.
    pub top_k: usize,

    /// Confidence threshold below which predictions are dropped.
    pub threshold: f32,

    /// Species labels treated as non-detections.
    pub exclusions: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            threshold: DEFAULT_THRESHOLD,
            exclusions: DEFAULT_EXCLUSIONS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Visit logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitsConfig {
    /// Directory for the visit log and saved frame artifacts.
    pub storage: Option<PathBuf>,

    /// Minimum interval between logged visits of the same species, in seconds.
    pub interval_secs: u64,
}

impl Default for VisitsConfig {
    fn default() -> Self {
        Self {
            storage: None,
            interval_secs: DEFAULT_VISIT_INTERVAL_SECS,
        }
    }
}

/// Consensus sampling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Sampling interval in seconds.
    pub interval_secs: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_CONSENSUS_INTERVAL_SECS,
        }
    }
}

/// Ambient lighting configuration for a Philips Hue bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Bridge host or IP address.
    pub bridge: String,

    /// Registered API username on the bridge.
    pub username: String,

    /// Light or light group id to colour on detections.
    pub light: String,

    /// Group id for the default scene restore.
    pub group: String,

    /// Scene id restored when no recognized species is present.
    pub scene: String,

    /// Scene transition time in deciseconds.
    pub transition_ds: u16,

    /// Colour per species label. Species absent from the palette produce no
    /// lighting reaction.
    pub palette: BTreeMap<String, LightColor>,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            bridge: String::new(),
            username: String::new(),
            light: String::new(),
            group: String::new(),
            scene: String::new(),
            transition_ds: hue::DEFAULT_TRANSITION_DS,
            palette: default_palette(),
        }
    }
}

/// Colour specification in the Hue colour model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightColor {
    /// Hue angle, 0..=65535.
    pub hue: u16,
    /// Saturation, 0..=255.
    pub sat: u8,
    /// Brightness, 0..=255.
    pub bri: u8,
}

/// Palette of common feeder species, matching the labels produced by the
/// stock feeder model.
pub fn default_palette() -> BTreeMap<String, LightColor> {
    BTreeMap::from([
        (
            "Cardinalis cardinalis (Northern Cardinal)".to_string(),
            LightColor {
                hue: 0,
                sat: 255,
                bri: 255,
            },
        ),
        (
            "Cyanocitta cristata (Blue Jay)".to_string(),
            LightColor {
                hue: 45000,
                sat: 255,
                bri: 255,
            },
        ),
        (
            "Archilochus colubris (Ruby-throated Hummingbird)".to_string(),
            LightColor {
                hue: 281,
                sat: 89,
                bri: 255,
            },
        ),
    ])
}
