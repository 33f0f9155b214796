use crate::candidate::{self, CandidateFilter, ImportedTaskCandidate};
use crate::config::EstimatorConfig;
use crate::csv_io::{self, ExportError, ImportError, ImportReport};
use crate::estimate::{EstimateInput, EstimateResult};
use crate::summary::ProjectSummary;
use crate::task::{EstimateField, Task};
use crate::task_store::{StoreError, StoreResult, TaskStore};
use chrono::NaiveDate;
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Everything one user works with: the task table, the last imported
/// candidate list and the active configuration. Nothing outlives the value.
pub struct EstimationSession {
    store: TaskStore,
    candidates: Vec<ImportedTaskCandidate>,
    config: EstimatorConfig,
}

impl Default for EstimationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EstimationSession {
    pub fn new() -> Self {
        Self::with_config(EstimatorConfig::default())
    }

    pub fn with_config(config: EstimatorConfig) -> Self {
        Self {
            store: TaskStore::new(),
            candidates: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn tasks(&self) -> StoreResult<Vec<Task>> {
        self.store.tasks()
    }

    pub fn find_task(&self, task_id: i32) -> StoreResult<Option<Task>> {
        self.store.find_task(task_id)
    }

    pub fn add_task(&mut self, name: &str, input: EstimateInput) -> StoreResult<i32> {
        self.store.add_task(name, input)
    }

    pub fn add_empty_task(&mut self) -> StoreResult<i32> {
        self.store.add_empty_task()
    }

    pub fn rename_task(&mut self, task_id: i32, name: &str) -> StoreResult<()> {
        self.store.update_name(task_id, name)
    }

    pub fn update_estimate_field(
        &mut self,
        task_id: i32,
        field: EstimateField,
        value: &str,
    ) -> StoreResult<()> {
        self.store.update_estimate_field(task_id, field, value)
    }

    pub fn set_estimate(&mut self, task_id: i32, input: &EstimateInput) -> StoreResult<()> {
        self.store.set_estimate(task_id, input)
    }

    /// Replaces name and estimate of an existing task in one step.
    pub fn update_task(&mut self, task: &Task) -> StoreResult<()> {
        if !self.store.contains(task.id)? {
            return Err(StoreError::TaskNotFound(task.id));
        }
        self.store.update_name(task.id, &task.name)?;
        self.store.set_estimate(task.id, &task.estimate_input())
    }

    pub fn delete_task(&mut self, task_id: i32) -> StoreResult<bool> {
        self.store.delete_task(task_id)
    }

    pub fn estimate_for(&self, task_id: i32) -> StoreResult<EstimateResult> {
        self.store.estimate_for(task_id)
    }

    pub fn summary(&self) -> StoreResult<ProjectSummary> {
        let tasks = self.store.tasks()?;
        let summary = ProjectSummary::from_tasks(&tasks, &self.config.confidence_levels);
        tracing::debug!(summary = %summary.to_cli_summary(), "computed project summary");
        Ok(summary)
    }

    pub fn candidates(&self) -> &[ImportedTaskCandidate] {
        &self.candidates
    }

    pub fn filter_candidates(&self, filter: &CandidateFilter) -> Vec<usize> {
        filter.apply(&self.candidates)
    }

    /// Parses the whole input first; on failure the previous candidate list stays.
    pub fn import_candidates<R: Read>(&mut self, input: R) -> Result<ImportReport, ImportError> {
        let report = csv_io::parse_candidates(input)?;
        self.candidates = report.candidates.clone();
        Ok(report)
    }

    pub fn import_candidates_from_path<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<ImportReport, ImportError> {
        let report = csv_io::load_candidates_from_csv(path)?;
        self.candidates = report.candidates.clone();
        Ok(report)
    }

    /// Distinct work item types and states, for filter choices.
    pub fn candidate_facets(&self) -> (Vec<String>, Vec<String>) {
        (
            candidate::work_item_types(&self.candidates),
            candidate::states(&self.candidates),
        )
    }

    /// Appends one new task per selected candidate index, in the given order.
    /// Out-of-range indices are rejected before anything is added.
    pub fn apply_selected(&mut self, indices: &[usize]) -> Result<Vec<i32>, SessionError> {
        if let Some(&bad) = indices.iter().find(|&&idx| idx >= self.candidates.len()) {
            return Err(SessionError::CandidateOutOfRange {
                index: bad,
                len: self.candidates.len(),
            });
        }
        let mut created = Vec::with_capacity(indices.len());
        for &idx in indices {
            created.push(self.store.add_imported(&self.candidates[idx])?);
        }
        tracing::info!(added = created.len(), "applied selected candidates");
        Ok(created)
    }

    pub fn can_export(&self) -> StoreResult<bool> {
        Ok(csv_io::has_exportable_tasks(&self.store.tasks()?))
    }

    pub fn export_csv(&self) -> Result<String, SessionError> {
        let tasks = self.store.tasks()?;
        Ok(csv_io::write_tasks_csv_string(&tasks)?)
    }

    pub fn export_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), SessionError> {
        let tasks = self.store.tasks()?;
        csv_io::save_tasks_to_csv(&tasks, path)?;
        Ok(())
    }

    pub fn export_file_name(&self, date: NaiveDate) -> String {
        csv_io::export_file_name(&self.config.export_file_prefix, date)
    }

    /// Appends tasks from a previous export; `Task ID` becomes the original id.
    pub fn restore_from_export<R: Read>(&mut self, input: R) -> Result<Vec<i32>, SessionError> {
        let rows = csv_io::read_exported_tasks(input)?;
        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            let input = EstimateInput::new(row.optimistic, row.most_likely, row.pessimistic);
            let original_id = Some(row.task_id).filter(|id| !id.trim().is_empty());
            created.push(
                self.store
                    .add_with_original_id(&row.name, input, original_id)?,
            );
        }
        tracing::info!(restored = created.len(), "restored tasks from export");
        Ok(created)
    }
}

#[derive(Debug)]
pub enum SessionError {
    CandidateOutOfRange { index: usize, len: usize },
    Import(ImportError),
    Export(ExportError),
    Store(StoreError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::CandidateOutOfRange { index, len } => write!(
                f,
                "candidate index {index} is out of range ({len} candidates loaded)"
            ),
            SessionError::Import(err) => write!(f, "{err}"),
            SessionError::Export(err) => write!(f, "{err}"),
            SessionError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ImportError> for SessionError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<ExportError> for SessionError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
