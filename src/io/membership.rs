//! Cluster-membership CSV ingest.
//!
//! The table maps `Postal code` to a cluster label column (`label6` by
//! default). Everything is read as text so leading zeros survive. Only header
//! names are trimmed; codes and labels are kept exactly as written.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{ClusterLabel, PostalCode};
use crate::error::ResolveError;
use crate::store::ClusterMembership;

pub const POSTAL_CODE_COLUMN: &str = "Postal code";

/// Read a membership table. The first row for a repeated postal code wins.
pub fn read_cluster_membership(path: &Path, label_column: &str) -> Result<ClusterMembership, ResolveError> {
    let file = File::open(path).map_err(|e| ResolveError::artifact(path, format!("failed to open: {e}")))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| ResolveError::artifact(path, format!("failed to read CSV headers: {e}")))?
        .clone();

    let code_idx = find_column(&headers, POSTAL_CODE_COLUMN)
        .ok_or_else(|| ResolveError::artifact(path, format!("missing column `{POSTAL_CODE_COLUMN}`")))?;
    let label_idx = find_column(&headers, label_column)
        .ok_or_else(|| ResolveError::artifact(path, format!("missing column `{label_column}`")))?;

    let mut labels = HashMap::new();
    let mut skipped = 0usize;
    let mut duplicates = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based.
        let line = idx + 2;
        let record = result
            .map_err(|e| ResolveError::artifact(path, format!("CSV parse error on line {line}: {e}")))?;

        let code = record.get(code_idx).filter(|s| !s.is_empty());
        let label = record.get(label_idx).filter(|s| !s.is_empty());
        let (Some(code), Some(label)) = (code, label) else {
            skipped += 1;
            continue;
        };

        match labels.entry(PostalCode::new(code)) {
            Entry::Vacant(slot) => {
                slot.insert(ClusterLabel::new(label));
            }
            Entry::Occupied(_) => duplicates += 1,
        }
    }

    if skipped > 0 || duplicates > 0 {
        warn!(path = %path.display(), skipped, duplicates, "ignored membership rows");
    }
    debug!(path = %path.display(), members = labels.len(), "loaded cluster membership");

    Ok(ClusterMembership::new(path, labels))
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    let wanted = normalize_header_name(name);
    headers.iter().position(|h| normalize_header_name(h) == wanted)
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}
