//! Visit debouncing.
//!
//! A visit is a logged occurrence of a species at the feeder, deduplicated
//! within a rolling window. The window rolls over on a wall-clock timer
//! independent of frame arrival; the tick only marks the rollover, the next
//! frame observes it and clears the logged set before evaluating.

use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::time::Instant;
use tracing::debug;

/// A new, loggable visit emitted by the debouncer.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitEvent {
    /// Species label.
    pub species: String,
    /// Top-1 confidence of the frame that opened the visit.
    pub confidence: f32,
    /// Wall-clock time of the visit.
    pub timestamp: DateTime<Local>,
}

/// Tracks which species have already been logged in the current visit window.
///
/// Lives for the process lifetime; the window is cleared, never destroyed.
#[derive(Debug)]
pub struct VisitDebouncer {
    open_since: Instant,
    logged: HashSet<String>,
    rolled: bool,
}

impl VisitDebouncer {
    /// Create a debouncer with an empty window opened at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            open_since: now,
            logged: HashSet::new(),
            rolled: false,
        }
    }

    /// Mark that the visit-window timer has fired.
    ///
    /// The logged set is cleared lazily by the next frame, mirroring the
    /// timer/callback split: the timer only flags, frame processing mutates.
    pub fn on_window_tick(&mut self, now: Instant) {
        self.rolled = true;
        self.open_since = now;
    }

    /// Evaluate one frame's top species.
    ///
    /// Returns a `VisitEvent` when this species has not yet been logged in
    /// the current window. The caller is responsible for exclusion-set
    /// filtering; anything passed here counts as a real detection.
    pub fn on_frame(
        &mut self,
        top_species: &str,
        confidence: f32,
        now: DateTime<Local>,
    ) -> Option<VisitEvent> {
        if self.rolled {
            debug!("Visit window rolled over, clearing {} species", self.logged.len());
            self.logged.clear();
            self.rolled = false;
        }

        if self.logged.contains(top_species) {
            // Same bird, same window: suppressed as a duplicate.
            return None;
        }

        self.logged.insert(top_species.to_string());
        Some(VisitEvent {
            species: top_species.to_string(),
            confidence,
            timestamp: now,
        })
    }

    /// Number of species logged in the current window.
    pub fn logged_count(&self) -> usize {
        self.logged.len()
    }

    /// When the current window opened.
    pub fn open_since(&self) -> Instant {
        self.open_since
    }
}
