//! CSV export
//!
//! Writes the final record snapshot as a delimited file: dynamic columns
//! (per-query ranks, open-now) sorted first, then the fixed base order.
//! When the target file already exists its rows are aligned to the combined
//! header, deduplicated against the new rows, and carried over.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::domain::business::{BusinessKey, BusinessRecord};

/// Timestamped default export filename, safe from collisions across runs.
pub fn default_export_filename(now: DateTime<Local>) -> String {
    format!("directory_export_{}.csv", now.format("%m_%d_%Y_%H-%M-%S"))
}

/// Export the snapshot to `path`; returns the number of data rows written.
pub fn export_csv(
    snapshot: &BTreeMap<BusinessKey, BusinessRecord>,
    base_columns: &[String],
    path: &Path,
) -> Result<usize> {
    let existing = read_existing(path)?;
    let columns = combined_columns(snapshot, base_columns, existing.as_ref());

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut seen: HashSet<Vec<String>> = HashSet::new();

    if let Some((headers, old_rows)) = &existing {
        debug!(
            "merging {} rows from existing export {}",
            old_rows.len(),
            path.display()
        );
        for old_row in old_rows {
            let by_name: HashMap<&str, &str> = headers
                .iter()
                .map(String::as_str)
                .zip(old_row.iter().map(String::as_str))
                .collect();
            let aligned: Vec<String> = columns
                .iter()
                .map(|column| by_name.get(column.as_str()).unwrap_or(&"").to_string())
                .collect();
            if seen.insert(aligned.clone()) {
                rows.push(aligned);
            }
        }
    }

    for record in snapshot.values() {
        let row: Vec<String> = columns
            .iter()
            .map(|column| record.get(column).to_string())
            .collect();
        if seen.insert(row.clone()) {
            rows.push(row);
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot open export file {}", path.display()))?;
    writer.write_record(&columns)?;
    let written = rows.len();
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;

    info!("exported {} rows to {}", written, path.display());
    Ok(written)
}

/// Headers and rows of a pre-existing export, when the file is present.
fn read_existing(path: &Path) -> Result<Option<(Vec<String>, Vec<Vec<String>>)>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot read existing export {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("existing export has no header row")?
        .iter()
        .map(str::to_string)
        .collect();
    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row.context("malformed row in existing export")?;
        rows.push(row.iter().map(str::to_string).collect());
    }
    Ok(Some((headers, rows)))
}

/// Sorted dynamic columns followed by the fixed base order. Columns found
/// only in a pre-existing export count as dynamic so their data survives.
fn combined_columns(
    snapshot: &BTreeMap<BusinessKey, BusinessRecord>,
    base_columns: &[String],
    existing: Option<&(Vec<String>, Vec<Vec<String>>)>,
) -> Vec<String> {
    let base: HashSet<&str> = base_columns.iter().map(String::as_str).collect();
    let mut dynamic: BTreeSet<String> = snapshot
        .values()
        .flat_map(|record| record.field_names())
        .filter(|name| !base.contains(name))
        .map(String::from)
        .collect();
    if let Some((headers, _)) = existing {
        for header in headers {
            if !base.contains(header.as_str()) {
                dynamic.insert(header.clone());
            }
        }
    }

    dynamic
        .into_iter()
        .chain(base_columns.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::business::{FieldPatch, fields, rank_field};

    fn record(pairs: &[(&str, &str)]) -> BusinessRecord {
        let patch: FieldPatch = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut record = BusinessRecord::default();
        record.apply(&patch);
        record
    }

    fn base_columns() -> Vec<String> {
        crate::domain::business::BASE_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    fn read_back(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_path(path).unwrap();
        let headers = reader.headers().unwrap().iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .map(|row| row.unwrap().iter().map(str::to_string).collect())
            .collect();
        (headers, rows)
    }

    #[test]
    fn dynamic_columns_sort_before_base_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut snapshot = BTreeMap::new();
        snapshot.insert(
            BusinessKey::new("Joe's Diner", "100 Main St"),
            record(&[
                (fields::NAME, "Joe's Diner"),
                (fields::OPEN_NOW, "Open now"),
                (&rank_field("coffee"), "1"),
            ]),
        );

        export_csv(&snapshot, &base_columns(), &path).unwrap();
        let (headers, rows) = read_back(&path);

        assert_eq!(headers[0], "coffee_rank");
        assert_eq!(headers[1], "open_now");
        assert_eq!(headers[2], fields::NAME);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "1");
        assert_eq!(rows[0][2], "Joe's Diner");
    }

    #[test]
    fn absent_fields_export_as_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut snapshot = BTreeMap::new();
        snapshot.insert(
            BusinessKey::new("A", "1 First St"),
            record(&[(fields::NAME, "A")]),
        );

        export_csv(&snapshot, &base_columns(), &path).unwrap();
        let (headers, rows) = read_back(&path);
        let email_index = headers.iter().position(|h| h == fields::EMAIL).unwrap();
        assert_eq!(rows[0][email_index], "");
    }

    #[test]
    fn merging_existing_file_deduplicates_identical_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut snapshot = BTreeMap::new();
        snapshot.insert(
            BusinessKey::new("A", "1 First St"),
            record(&[(fields::NAME, "A"), (fields::CITY, "Austin")]),
        );
        export_csv(&snapshot, &base_columns(), &path).unwrap();

        // Re-export the same snapshot plus one new record into the same file.
        snapshot.insert(
            BusinessKey::new("B", "2 Second St"),
            record(&[(fields::NAME, "B"), (fields::CITY, "Dallas")]),
        );
        let written = export_csv(&snapshot, &base_columns(), &path).unwrap();

        assert_eq!(written, 2);
        let (_, rows) = read_back(&path);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn columns_only_in_existing_file_survive_a_merge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut first = BTreeMap::new();
        first.insert(
            BusinessKey::new("A", "1 First St"),
            record(&[(fields::NAME, "A"), (&rank_field("tacos"), "4")]),
        );
        export_csv(&first, &base_columns(), &path).unwrap();

        let mut second = BTreeMap::new();
        second.insert(
            BusinessKey::new("B", "2 Second St"),
            record(&[(fields::NAME, "B"), (&rank_field("coffee"), "2")]),
        );
        export_csv(&second, &base_columns(), &path).unwrap();

        let (headers, rows) = read_back(&path);
        assert!(headers.contains(&"tacos_rank".to_string()));
        assert!(headers.contains(&"coffee_rank".to_string()));
        assert_eq!(rows.len(), 2);
        let tacos_index = headers.iter().position(|h| h == "tacos_rank").unwrap();
        assert_eq!(rows[0][tacos_index], "4");
    }

    #[test]
    fn filename_pattern_is_timestamped() {
        let now = Local::now();
        let name = default_export_filename(now);
        assert!(name.starts_with("directory_export_"));
        assert!(name.ends_with(".csv"));
    }
}
