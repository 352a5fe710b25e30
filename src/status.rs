//! Read-only status queries.
//!
//! The per-species visit tally is derived by scanning the persisted visit
//! log rather than kept as live state, so reporting stays decoupled from the
//! frame loop.

use crate::constants::VISIT_LOG_FILENAME;
use crate::error::{Error, Result};
use crate::sink::VisitRecord;
use std::collections::BTreeMap;
use std::path::Path;

/// Count logged visits per species from the visit log in `storage_dir`.
///
/// A missing log means no visits yet and yields an empty tally.
pub fn visit_tally(storage_dir: &Path) -> Result<BTreeMap<String, u64>> {
    let log_path = storage_dir.join(VISIT_LOG_FILENAME);
    if !log_path.exists() {
        return Ok(BTreeMap::new());
    }

    let mut reader = csv::Reader::from_path(&log_path).map_err(|e| Error::VisitLogRead {
        path: log_path.clone(),
        source: Box::new(e),
    })?;

    let mut tally: BTreeMap<String, u64> = BTreeMap::new();
    for record in reader.deserialize::<VisitRecord>() {
        let record = record.map_err(|e| Error::VisitLogRead {
            path: log_path.clone(),
            source: Box::new(e),
        })?;
        *tally.entry(record.species).or_insert(0) += 1;
    }

    Ok(tally)
}
