use super::ImportError;
use crate::candidate::{ImportedTaskCandidate, normalize_assignee, normalize_state};
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Outcome of a successful import: the candidates plus how many rows were filtered out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub candidates: Vec<ImportedTaskCandidate>,
    pub rows_read: usize,
    pub dropped: usize,
}

#[derive(Debug, Default)]
struct ColumnMap {
    id: Option<usize>,
    work_item_type: Option<usize>,
    title: Option<usize>,
    assigned_to: Option<usize>,
    state: Option<usize>,
    tags: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut map = ColumnMap::default();
        for (idx, raw) in headers.iter().enumerate() {
            let name = raw.trim_start_matches('\u{feff}').trim().to_ascii_lowercase();
            let slot = match name.as_str() {
                "id" => &mut map.id,
                "work item type" => &mut map.work_item_type,
                "title" => &mut map.title,
                "assigned to" => &mut map.assigned_to,
                "state" => &mut map.state,
                "tags" => &mut map.tags,
                _ => continue,
            };
            // first matching column wins
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        map
    }

    fn cell<'r>(record: &'r StringRecord, idx: Option<usize>) -> Option<&'r str> {
        idx.and_then(|i| record.get(i))
    }

    fn candidate(&self, record: &StringRecord) -> Option<ImportedTaskCandidate> {
        let external_id = Self::cell(record, self.id)
            .map(str::trim)
            .filter(|v| !v.is_empty())?;
        let title = Self::cell(record, self.title)
            .map(str::trim)
            .filter(|v| !v.is_empty())?;

        Some(ImportedTaskCandidate {
            external_id: external_id.to_string(),
            work_item_type: Self::cell(record, self.work_item_type)
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            title: title.to_string(),
            assigned_to: normalize_assignee(Self::cell(record, self.assigned_to)),
            state: normalize_state(Self::cell(record, self.state)),
            tags: Self::cell(record, self.tags).unwrap_or("").to_string(),
        })
    }
}

/// Parses a work-item export. Rows lacking an ID or a Title are skipped; only a
/// structurally unreadable input is an error.
pub fn parse_candidates<R: Read>(input: R) -> Result<ImportReport, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ImportError::MissingHeader);
    }
    let columns = ColumnMap::from_headers(&headers);
    if columns.id.is_none() || columns.title.is_none() {
        tracing::warn!(
            headers = ?headers.iter().collect::<Vec<_>>(),
            "import has no ID or Title column; every row will be skipped"
        );
    }

    let mut report = ImportReport::default();
    for record in reader.records() {
        let record = record?;
        report.rows_read += 1;
        match columns.candidate(&record) {
            Some(candidate) => report.candidates.push(candidate),
            None => {
                report.dropped += 1;
                tracing::debug!(
                    line = record.position().map(|p| p.line()),
                    "skipping row without ID or Title"
                );
            }
        }
    }

    tracing::info!(
        rows = report.rows_read,
        imported = report.candidates.len(),
        dropped = report.dropped,
        "parsed work item export"
    );
    Ok(report)
}

pub fn parse_candidates_str(input: &str) -> Result<ImportReport, ImportError> {
    parse_candidates(input.as_bytes())
}

pub fn load_candidates_from_csv<P: AsRef<Path>>(path: P) -> Result<ImportReport, ImportError> {
    let file = File::open(path)?;
    parse_candidates(file)
}
