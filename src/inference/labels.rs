//! Label file parsing.

use crate::error::{Error, Result};
use std::path::Path;

/// Highest label index accepted from an indexed labels file. Classification
/// models top out in the tens of thousands of classes; anything beyond this
/// is a corrupt file, not a big model.
const MAX_LABEL_INDEX: usize = 100_000;

/// Read a labels file into an index-ordered list.
///
/// Lines may be either a bare label or `<index> <label>`. Indexed lines are
/// placed at their stated position (sparse files are padded with empty
/// labels); bare lines are appended in file order. Blank lines are skipped.
pub fn read_labels(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::LabelsRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut labels: Vec<String> = Vec::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // "<index> <label>" form used by exported classification models.
        let mut parts = line.splitn(2, char::is_whitespace);
        let first = parts.next().unwrap_or_default();
        if let (Ok(index), Some(rest)) = (first.parse::<usize>(), parts.next()) {
            if index > MAX_LABEL_INDEX {
                return Err(Error::LabelsParse {
                    path: path.to_path_buf(),
                    message: format!("label index {index} out of range (max {MAX_LABEL_INDEX})"),
                });
            }
            if index >= labels.len() {
                labels.resize(index + 1, String::new());
            }
            labels[index] = rest.trim().to_string();
        } else {
            labels.push(line.to_string());
        }
    }

    Ok(labels)
}
