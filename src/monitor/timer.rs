//! Periodic task scheduling.
//!
//! Timers here are deliberately simple: a named thread that sleeps for the
//! period and invokes the callback, forever. Each firing schedules the next
//! by looping; there is no drift correction and no cancellation. The process
//! exiting is the only way a timer stops, which matches the monitor's
//! lifetime (its state lives until shutdown).

use crate::error::{Error, Result};
use std::thread;
use std::time::Duration;

/// Spawn a self-rescheduling periodic task on its own thread.
///
/// The first firing happens one full `period` after the call. The callback
/// must do its own locking; see `FeederMonitor` for the shared-state
/// contract.
pub fn spawn_periodic<F>(name: &str, period: Duration, mut callback: F) -> Result<()>
where
    F: FnMut() + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            loop {
                thread::sleep(period);
                callback();
            }
        })
        .map_err(|e| Error::Internal {
            message: format!("failed to spawn periodic task '{name}': {e}"),
        })?;
    Ok(())
}
