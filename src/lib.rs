pub mod candidate;
pub mod config;
pub mod csv_io;
pub mod estimate;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod session;
pub mod summary;
pub mod task;
pub mod task_store;

pub use candidate::{CandidateFilter, ImportedTaskCandidate};
pub use config::{ConfigError, EstimatorConfig};
pub use csv_io::{
    ExportError, ExportedTaskRow, ImportError, ImportReport, export_file_name,
    has_exportable_tasks, load_candidates_from_csv, parse_candidates, parse_candidates_str,
    read_exported_tasks, save_tasks_to_csv, write_tasks_csv, write_tasks_csv_string,
};
pub use estimate::{EstimateInput, EstimateResult, ThreePointEstimate, calculate, format_hours};
pub use session::{EstimationSession, SessionError};
pub use summary::{ConfidenceInterval, ConfidenceLevel, Interval, ProjectSummary};
pub use task::{EstimateField, Task};
pub use task_store::{StoreError, TaskStore};
