//! Philips Hue bridge client.
//!
//! Speaks the bridge's local REST API directly: light state changes go to
//! `PUT /api/<user>/lights/<id>/state`, scene recalls to
//! `PUT /api/<user>/groups/<id>/action`. The bridge answers 200 even for
//! rejected commands, with per-field error objects in the body, so the body
//! is inspected as well as the status.

use crate::config::{LightColor, LightingConfig};
use crate::constants::hue;
use crate::error::{Error, Result};
use crate::lighting::LightingDevice;
use tracing::{debug, info};

/// Hue bridge backed lighting device.
pub struct HueLights {
    client: reqwest::blocking::Client,
    base_url: String,
    light: String,
    group: String,
    scene: String,
    transition_ds: u16,
}

impl HueLights {
    /// Build a client for the configured bridge.
    pub fn from_config(config: &LightingConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(hue::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::LightingCommand {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        info!("Hue bridge: {} (light {})", config.bridge, config.light);

        Ok(Self {
            client,
            base_url: format!("http://{}/api/{}", config.bridge, config.username),
            light: config.light.clone(),
            group: config.group.clone(),
            scene: config.scene.clone(),
            transition_ds: config.transition_ds,
        })
    }

    /// Issue a state change and check both HTTP status and body errors.
    fn put(&self, url: &str, body: &serde_json::Value) -> Result<()> {
        let response = self
            .client
            .put(url)
            .json(body)
            .send()
            .map_err(|e| Error::LightingCommand {
                reason: format!("bridge unreachable: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::LightingCommand {
                reason: format!("bridge returned HTTP {status}"),
            });
        }

        let text = response.text().map_err(|e| Error::LightingCommand {
            reason: format!("failed to read bridge response: {e}"),
        })?;
        if let Some(description) = first_error_description(&text) {
            return Err(Error::LightingCommand {
                reason: format!("bridge rejected command: {description}"),
            });
        }

        Ok(())
    }
}

impl LightingDevice for HueLights {
    fn set_color(&mut self, color: LightColor) -> Result<()> {
        debug!(
            "Hue set_color light={} hue={} sat={} bri={}",
            self.light, color.hue, color.sat, color.bri
        );
        let url = format!("{}/lights/{}/state", self.base_url, self.light);
        self.put(
            &url,
            &serde_json::json!({
                "on": true,
                "hue": color.hue,
                "sat": color.sat,
                "bri": color.bri,
            }),
        )
    }

    fn restore_default(&mut self) -> Result<()> {
        debug!("Hue restore scene={} group={}", self.scene, self.group);
        let url = format!("{}/groups/{}/action", self.base_url, self.group);
        self.put(
            &url,
            &serde_json::json!({
                "scene": self.scene,
                "transitiontime": self.transition_ds,
            }),
        )
    }
}

/// Extract the first error description from a bridge response body, if any.
///
/// Success bodies look like `[{"success": {...}}]`, failures like
/// `[{"error": {"type": 3, "description": "..."}}]`.
fn first_error_description(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    let entries = parsed.as_array()?;
    for entry in entries {
        if let Some(error) = entry.get("error") {
            let description = error
                .get("description")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error");
            return Some(description.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_body_has_no_error() {
        let body = r#"[{"success": {"/lights/3/state/hue": 45000}}]"#;
        assert_eq!(first_error_description(body), None);
    }

    #[test]
    fn test_error_body_is_detected() {
        let body = r#"[{"error": {"type": 3, "address": "/lights/99", "description": "resource not available"}}]"#;
        assert_eq!(
            first_error_description(body),
            Some("resource not available".to_string())
        );
    }

    #[test]
    fn test_mixed_body_reports_first_error() {
        let body = r#"[{"success": {"a": 1}}, {"error": {"description": "rejected"}}]"#;
        assert_eq!(first_error_description(body), Some("rejected".to_string()));
    }

    #[test]
    fn test_non_json_body_is_ignored() {
        assert_eq!(first_error_description("not json"), None);
    }
}
