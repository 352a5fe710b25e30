//! Configuration validation.
//!
//! Everything here is checked once at startup; a failure is fatal per the
//! error taxonomy (bad model or bad settings abort the process).

use crate::config::Config;
use crate::constants::confidence;
use crate::error::{Error, Result};

/// Validate the entire resolved configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_model(config)?;
    validate_detection(config)?;
    validate_intervals(config)?;
    validate_paths(config)?;
    validate_lighting(config)?;
    Ok(())
}

/// Validate storage and frame source settings.
fn validate_paths(config: &Config) -> Result<()> {
    if config.visits.storage.is_none() {
        return Err(Error::ConfigValidation {
            message: "no storage directory specified (use --storage or set visits.storage in config)"
                .to_string(),
        });
    }

    if config.capture.source.is_none() {
        return Err(Error::ConfigValidation {
            message: "no frame source specified (use --source or set capture.source in config)"
                .to_string(),
        });
    }

    Ok(())
}

/// Validate model settings and check files exist.
fn validate_model(config: &Config) -> Result<()> {
    let model = &config.model;

    let Some(ref path) = model.path else {
        return Err(Error::ConfigValidation {
            message: "no model path specified (use --model or set model.path in config)"
                .to_string(),
        });
    };
    if !path.exists() {
        return Err(Error::ModelFileNotFound { path: path.clone() });
    }

    let Some(ref labels) = model.labels else {
        return Err(Error::ConfigValidation {
            message: "no labels path specified (use --labels or set model.labels in config)"
                .to_string(),
        });
    };
    if !labels.exists() {
        return Err(Error::LabelsFileNotFound {
            path: labels.clone(),
        });
    }

    if model.input_width == 0 || model.input_height == 0 {
        return Err(Error::ConfigValidation {
            message: format!(
                "model input dimensions must be non-zero, got {}x{}",
                model.input_width, model.input_height
            ),
        });
    }

    Ok(())
}

/// Validate detection settings.
fn validate_detection(config: &Config) -> Result<()> {
    let detection = &config.detection;

    if !(confidence::MIN..=confidence::MAX).contains(&detection.threshold) {
        return Err(Error::ConfigValidation {
            message: format!(
                "threshold must be between {} and {}, got {}",
                confidence::MIN,
                confidence::MAX,
                detection.threshold
            ),
        });
    }

    if detection.top_k == 0 {
        return Err(Error::ConfigValidation {
            message: "top_k must be at least 1".to_string(),
        });
    }

    Ok(())
}

/// Validate timer intervals.
fn validate_intervals(config: &Config) -> Result<()> {
    if config.visits.interval_secs == 0 {
        return Err(Error::ConfigValidation {
            message: "visits.interval_secs must be at least 1".to_string(),
        });
    }

    if config.consensus.interval_secs == 0 {
        return Err(Error::ConfigValidation {
            message: "consensus.interval_secs must be at least 1".to_string(),
        });
    }

    Ok(())
}

/// Validate lighting settings when lighting is configured.
fn validate_lighting(config: &Config) -> Result<()> {
    let Some(ref lighting) = config.lighting else {
        return Ok(());
    };

    if lighting.bridge.is_empty() {
        return Err(Error::ConfigValidation {
            message: "lighting.bridge must be set when lighting is configured".to_string(),
        });
    }

    if lighting.username.is_empty() {
        return Err(Error::ConfigValidation {
            message: "lighting.username must be set when lighting is configured".to_string(),
        });
    }

    if lighting.light.is_empty() {
        return Err(Error::ConfigValidation {
            message: "lighting.light must be set when lighting is configured".to_string(),
        });
    }

    Ok(())
}
