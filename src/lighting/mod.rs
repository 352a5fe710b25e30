//! Ambient lighting devices.
//!
//! The reactor in `monitor::reactor` drives a [`LightingDevice`]; commands
//! are best-effort and a failed command is recoverable, so implementations
//! return errors rather than panic and never retry internally.

mod hue;

pub use hue::HueLights;

use crate::config::LightColor;
use crate::error::Result;
use tracing::debug;

/// A device that can reflect a species colour or a default scene.
pub trait LightingDevice: Send {
    /// Set the configured light target to the given colour.
    fn set_color(&mut self, color: LightColor) -> Result<()>;

    /// Restore the configured default scene.
    fn restore_default(&mut self) -> Result<()>;
}

/// No-op device used when no lighting bridge is configured.
#[derive(Debug, Default)]
pub struct NullLights;

impl LightingDevice for NullLights {
    fn set_color(&mut self, color: LightColor) -> Result<()> {
        debug!("Lighting disabled, dropping set_color(hue={})", color.hue);
        Ok(())
    }

    fn restore_default(&mut self) -> Result<()> {
        debug!("Lighting disabled, dropping restore_default");
        Ok(())
    }
}
