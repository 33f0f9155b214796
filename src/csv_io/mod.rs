use std::fmt;
use std::io;

pub mod export;
pub mod import;

pub use export::{
    DEFAULT_EXPORT_PREFIX, EXPORT_HEADERS, ExportedTaskRow, export_file_name,
    has_exportable_tasks, read_exported_tasks, save_tasks_to_csv, write_tasks_csv,
    write_tasks_csv_string,
};
pub use import::{
    ImportReport, load_candidates_from_csv, parse_candidates, parse_candidates_str,
};

#[derive(Debug)]
pub enum ImportError {
    Csv(csv::Error),
    Io(io::Error),
    MissingHeader,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Csv(err) => write!(f, "could not parse CSV: {err}"),
            ImportError::Io(err) => write!(f, "io error: {err}"),
            ImportError::MissingHeader => write!(f, "CSV input has no header row"),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<csv::Error> for ImportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<io::Error> for ImportError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Io(io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Csv(err) => write!(f, "csv error: {err}"),
            ExportError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<io::Error> for ExportError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
