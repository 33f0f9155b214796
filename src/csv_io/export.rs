use super::{ExportError, ImportError};
use crate::task::Task;
use chrono::NaiveDate;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub const EXPORT_HEADERS: [&str; 7] = [
    "Task ID",
    "Task Name",
    "Optimistic",
    "Most Likely",
    "Pessimistic",
    "Expected Duration",
    "Standard Deviation",
];

pub const DEFAULT_EXPORT_PREFIX: &str = "pert_estimation";

/// One row of an estimate export. Raw inputs are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedTaskRow {
    #[serde(rename = "Task ID")]
    pub task_id: String,
    #[serde(rename = "Task Name")]
    pub name: String,
    #[serde(rename = "Optimistic")]
    pub optimistic: String,
    #[serde(rename = "Most Likely")]
    pub most_likely: String,
    #[serde(rename = "Pessimistic")]
    pub pessimistic: String,
    #[serde(rename = "Expected Duration", default)]
    pub expected: String,
    #[serde(rename = "Standard Deviation", default)]
    pub std_dev: String,
}

impl From<&Task> for ExportedTaskRow {
    fn from(task: &Task) -> Self {
        let estimate = task.estimate();
        Self {
            task_id: task.display_id(),
            name: task.name.clone(),
            optimistic: task.optimistic.clone(),
            most_likely: task.most_likely.clone(),
            pessimistic: task.pessimistic.clone(),
            expected: estimate.expected_display(),
            std_dev: estimate.std_dev_display(),
        }
    }
}

/// Export is offered only once some task carries a name.
pub fn has_exportable_tasks(tasks: &[Task]) -> bool {
    tasks.iter().any(Task::has_name)
}

pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y-%m-%d"))
}

/// Writes the header followed by one row per task; an empty slice yields a header-only file.
pub fn write_tasks_csv<W: Write>(tasks: &[Task], output: W) -> Result<W, ExportError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(output);
    writer.write_record(EXPORT_HEADERS)?;
    for task in tasks {
        writer.serialize(ExportedTaskRow::from(task))?;
    }
    writer.flush()?;
    let output = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    tracing::debug!(rows = tasks.len(), "wrote estimate export");
    Ok(output)
}

pub fn write_tasks_csv_string(tasks: &[Task]) -> Result<String, ExportError> {
    let bytes = write_tasks_csv(tasks, Vec::new())?;
    String::from_utf8(bytes)
        .map_err(|err| ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

pub fn save_tasks_to_csv<P: AsRef<Path>>(tasks: &[Task], path: P) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;
    write_tasks_csv(tasks, file)?;
    tracing::info!(path = %path.as_ref().display(), rows = tasks.len(), "saved estimate export");
    Ok(())
}

/// Reads a file produced by [`write_tasks_csv`] back into rows.
pub fn read_exported_tasks<R: Read>(input: R) -> Result<Vec<ExportedTaskRow>, ImportError> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers()?;
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ImportError::MissingHeader);
    }
    let mut rows = Vec::new();
    for record in reader.deserialize::<ExportedTaskRow>() {
        rows.push(record?);
    }
    Ok(rows)
}
