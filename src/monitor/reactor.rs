//! Lighting reactor.
//!
//! Two-state machine: `indicated` means the lights currently reflect a
//! recognized species, otherwise the default scene is active. A consensus
//! outside the palette restores the default immediately rather than waiting
//! for an empty interval; that keeps flicker down when an unlit species
//! lingers at the feeder.

use crate::config::LightColor;
use crate::lighting::LightingDevice;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Maps consensus labels to lighting actions and tracks the indicated flag.
pub struct LightingReactor {
    palette: BTreeMap<String, LightColor>,
    device: Box<dyn LightingDevice>,
    indicated: bool,
}

impl LightingReactor {
    /// Create a reactor in the default (not indicated) state.
    pub fn new(palette: BTreeMap<String, LightColor>, device: Box<dyn LightingDevice>) -> Self {
        Self {
            palette,
            device,
            indicated: false,
        }
    }

    /// React to one interval's consensus result.
    ///
    /// Device failures are logged and leave `indicated` unchanged, so the
    /// same action is naturally retried on the next tick. No retry happens
    /// mid-interval.
    pub fn on_consensus(&mut self, label: Option<&str>) {
        // A consensus outside the palette behaves exactly like no consensus.
        let color = label.and_then(|l| self.palette.get(l).copied());

        match color {
            Some(color) => match self.device.set_color(color) {
                Ok(()) => {
                    if !self.indicated {
                        info!("Lights set for {}", label.unwrap_or_default());
                    }
                    self.indicated = true;
                }
                Err(e) => warn!("Failed to set species colour: {e}"),
            },
            None => {
                if !self.indicated {
                    // Default scene already active, avoid the redundant call.
                    return;
                }
                match self.device.restore_default() {
                    Ok(()) => {
                        info!("Lights restored to default scene");
                        self.indicated = false;
                    }
                    Err(e) => warn!("Failed to restore default scene: {e}"),
                }
            }
        }
    }

    /// Whether lighting currently reflects a recognized species.
    pub fn indicated(&self) -> bool {
        self.indicated
    }
}
