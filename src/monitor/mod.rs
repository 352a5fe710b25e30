//! The visit/consensus state machine.
//!
//! [`FeederMonitor`] owns the three reactive components — visit debouncer,
//! consensus aggregator, lighting reactor — plus the exclusion set, and is
//! the single mutual-exclusion domain of the system: callers wrap it in
//! `Arc<Mutex<_>>` and both timer callbacks and frame processing must hold
//! the lock before touching it, so state mutations never interleave.

mod consensus;
mod debounce;
mod reactor;
pub mod timer;

pub use consensus::ConsensusAggregator;
pub use debounce::{VisitDebouncer, VisitEvent};
pub use reactor::LightingReactor;

use crate::config::LightColor;
use crate::inference::ClassifiedFrame;
use crate::lighting::LightingDevice;
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;
use tracing::debug;

/// The core reactive state machine behind one feeder camera.
pub struct FeederMonitor {
    exclusions: HashSet<String>,
    debouncer: VisitDebouncer,
    aggregator: ConsensusAggregator,
    reactor: LightingReactor,
}

impl FeederMonitor {
    /// Create a monitor with empty windows opened at `now`.
    pub fn new(
        exclusions: HashSet<String>,
        palette: BTreeMap<String, LightColor>,
        device: Box<dyn LightingDevice>,
        now: Instant,
    ) -> Self {
        Self {
            exclusions,
            debouncer: VisitDebouncer::new(now),
            aggregator: ConsensusAggregator::new(now),
            reactor: LightingReactor::new(palette, device),
        }
    }

    /// Process one classified frame.
    ///
    /// The debouncer and the aggregator are independent projections of the
    /// same stream; both read the top-1 result here, in the same step. A
    /// frame with no detection, or whose top species is excluded, mutates
    /// nothing.
    pub fn process_frame(&mut self, frame: &ClassifiedFrame) -> Option<VisitEvent> {
        let top = frame.top()?;

        if self.exclusions.contains(&top.label) {
            debug!("Excluded species: {}", top.label);
            return None;
        }

        self.aggregator.observe(&top.label);
        self.debouncer
            .on_frame(&top.label, top.confidence, frame.timestamp)
    }

    /// Visit-window timer callback: mark the window rolled over.
    pub fn visit_window_tick(&mut self, now: Instant) {
        self.debouncer.on_window_tick(now);
    }

    /// Consensus timer callback: resolve the interval and drive lighting.
    ///
    /// Returns the resolved consensus label for observability.
    pub fn consensus_tick(&mut self, now: Instant) -> Option<String> {
        let consensus = self.aggregator.on_interval_tick(now);
        debug!("Consensus: {:?}", consensus);
        self.reactor.on_consensus(consensus.as_deref());
        consensus
    }

    /// Whether lighting currently reflects a recognized species.
    pub fn indicated(&self) -> bool {
        self.reactor.indicated()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::inference::RankedPrediction;
    use crate::lighting::NullLights;
    use chrono::Local;

    fn frame(label: &str, confidence: f32) -> ClassifiedFrame {
        ClassifiedFrame {
            ranked: vec![RankedPrediction {
                label: label.to_string(),
                confidence,
            }],
            timestamp: Local::now(),
        }
    }

    fn empty_frame() -> ClassifiedFrame {
        ClassifiedFrame {
            ranked: Vec::new(),
            timestamp: Local::now(),
        }
    }

    fn monitor() -> FeederMonitor {
        let exclusions = HashSet::from(["background".to_string()]);
        FeederMonitor::new(
            exclusions,
            BTreeMap::new(),
            Box::new(NullLights),
            Instant::now(),
        )
    }

    #[test]
    fn test_consecutive_frames_one_visit() {
        let mut m = monitor();
        let mut visits = 0;
        for _ in 0..5 {
            if m.process_frame(&frame("Cardinal", 0.9)).is_some() {
                visits += 1;
            }
        }
        assert_eq!(visits, 1);
    }

    #[test]
    fn test_excluded_species_mutates_nothing() {
        let mut m = monitor();
        assert!(m.process_frame(&frame("background", 0.99)).is_none());
        // Nothing buffered for consensus either.
        assert_eq!(m.consensus_tick(Instant::now()), None);
    }

    #[test]
    fn test_empty_frame_is_noop() {
        let mut m = monitor();
        m.process_frame(&frame("Cardinal", 0.9));
        assert!(m.process_frame(&empty_frame()).is_none());
        // The earlier sample is still buffered; empty frames do not reset.
        assert_eq!(m.consensus_tick(Instant::now()), Some("Cardinal".to_string()));
    }

    #[test]
    fn test_window_rollover_relogs_species() {
        let mut m = monitor();
        assert!(m.process_frame(&frame("Cardinal", 0.9)).is_some());
        m.visit_window_tick(Instant::now());
        assert!(m.process_frame(&frame("Cardinal", 0.9)).is_some());
    }

    #[test]
    fn test_consensus_is_majority_of_interval() {
        let mut m = monitor();
        for label in ["Cardinal", "Blue Jay", "Cardinal"] {
            m.process_frame(&frame(label, 0.8));
        }
        assert_eq!(m.consensus_tick(Instant::now()), Some("Cardinal".to_string()));
        // Buffer cleared; next interval is empty.
        assert_eq!(m.consensus_tick(Instant::now()), None);
    }

    #[test]
    fn test_debounce_and_consensus_windows_are_independent() {
        let mut m = monitor();
        m.process_frame(&frame("Cardinal", 0.9));
        // Consensus tick must not clear the visit window.
        m.consensus_tick(Instant::now());
        assert!(m.process_frame(&frame("Cardinal", 0.9)).is_none());
        // Visit tick must not clear the consensus buffer.
        m.process_frame(&frame("Blue Jay", 0.9));
        m.visit_window_tick(Instant::now());
        assert_eq!(m.consensus_tick(Instant::now()), Some("Cardinal".to_string()));
    }
}
