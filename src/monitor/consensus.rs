//! Consensus aggregation.
//!
//! Buffers every non-excluded top-species observation and resolves the most
//! frequent one at each interval tick. The consensus label drives ambient
//! lighting only; it is independent of the visit log.

use std::collections::HashMap;
use std::time::Instant;

/// Accumulates species observations over a fixed sampling interval.
#[derive(Debug)]
pub struct ConsensusAggregator {
    window_start: Instant,
    samples: Vec<String>,
}

impl ConsensusAggregator {
    /// Create an aggregator with an empty buffer starting at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            samples: Vec::new(),
        }
    }

    /// Append one observation to the current buffer.
    ///
    /// Duplicates within the interval are expected; they drive the vote.
    pub fn observe(&mut self, label: &str) {
        self.samples.push(label.to_string());
    }

    /// Resolve the interval's consensus and reset the buffer.
    ///
    /// Returns the most frequent label (ties broken by first-seen order), or
    /// `None` if nothing was observed this interval. The buffer is cleared
    /// either way.
    pub fn on_interval_tick(&mut self, now: Instant) -> Option<String> {
        let consensus = resolve_mode(&self.samples);
        self.samples.clear();
        self.window_start = now;
        consensus
    }

    /// Number of samples buffered so far this interval.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// When the current interval started.
    pub fn window_start(&self) -> Instant {
        self.window_start
    }
}

/// Most frequent label in `samples`, first-seen order breaking ties.
fn resolve_mode(samples: &[String]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for sample in samples {
        let count = counts.entry(sample.as_str()).or_insert(0);
        if *count == 0 {
            first_seen.push(sample.as_str());
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for label in first_seen {
        let count = counts[label];
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }

    best.map(|(label, _)| label.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn aggregator_with(samples: &[&str]) -> ConsensusAggregator {
        let mut agg = ConsensusAggregator::new(Instant::now());
        for sample in samples {
            agg.observe(sample);
        }
        agg
    }

    #[test]
    fn test_majority_wins() {
        let mut agg = aggregator_with(&["A", "B", "A", "A", "C"]);
        assert_eq!(agg.on_interval_tick(Instant::now()), Some("A".to_string()));
    }

    #[test]
    fn test_tie_broken_by_first_seen() {
        let mut agg = aggregator_with(&["A", "B", "A", "B"]);
        assert_eq!(agg.on_interval_tick(Instant::now()), Some("A".to_string()));
    }

    #[test]
    fn test_tie_first_seen_not_alphabetical() {
        let mut agg = aggregator_with(&["B", "A", "B", "A"]);
        assert_eq!(agg.on_interval_tick(Instant::now()), Some("B".to_string()));
    }

    #[test]
    fn test_empty_interval_resolves_none() {
        let mut agg = ConsensusAggregator::new(Instant::now());
        assert_eq!(agg.on_interval_tick(Instant::now()), None);
    }

    #[test]
    fn test_tick_clears_buffer() {
        let mut agg = aggregator_with(&["A", "A"]);
        assert_eq!(agg.sample_count(), 2);
        agg.on_interval_tick(Instant::now());
        assert_eq!(agg.sample_count(), 0);
        // Next interval starts fresh: a single B outvotes nothing.
        agg.observe("B");
        assert_eq!(agg.on_interval_tick(Instant::now()), Some("B".to_string()));
    }

    #[test]
    fn test_single_sample_is_consensus() {
        let mut agg = aggregator_with(&["Blue Jay"]);
        assert_eq!(
            agg.on_interval_tick(Instant::now()),
            Some("Blue Jay".to_string())
        );
    }
}
