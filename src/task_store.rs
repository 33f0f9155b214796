use crate::candidate::ImportedTaskCandidate;
use crate::estimate::{EstimateInput, EstimateResult};
use crate::task::{EstimateField, Task};
use polars::prelude::*;
use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    TaskNotFound(i32),
    DataFrame(PolarsError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::TaskNotFound(id) => write!(f, "task {id} not found"),
            StoreError::DataFrame(err) => write!(f, "dataframe error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<PolarsError> for StoreError {
    fn from(value: PolarsError) -> Self {
        Self::DataFrame(value)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Ordered, in-memory task table. Row order is insertion order; ids are handed
/// out by the store and never reused, even after deletion.
pub struct TaskStore {
    df: DataFrame,
    next_id: i32,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            df: DataFrame::empty_with_schema(&Self::default_schema()),
            next_id: 1,
        }
    }

    fn default_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("id".into(), DataType::Int32),
            Field::new("name".into(), DataType::String),
            Field::new("optimistic".into(), DataType::String),
            Field::new("most_likely".into(), DataType::String),
            Field::new("pessimistic".into(), DataType::String),
            Field::new("original_id".into(), DataType::String),
        ])
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn tasks(&self) -> StoreResult<Vec<Task>> {
        let df = self.dataframe();
        let mut tasks = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            tasks.push(Task::from_dataframe_row(df, idx)?);
        }
        Ok(tasks)
    }

    pub fn find_task(&self, task_id: i32) -> StoreResult<Option<Task>> {
        match self.row_index(task_id)? {
            Some(idx) => Ok(Some(Task::from_dataframe_row(&self.df, idx)?)),
            None => Ok(None),
        }
    }

    pub fn contains(&self, task_id: i32) -> StoreResult<bool> {
        Ok(self.row_index(task_id)?.is_some())
    }

    pub fn estimate_for(&self, task_id: i32) -> StoreResult<EstimateResult> {
        self.find_task(task_id)?
            .map(|task| task.estimate())
            .ok_or(StoreError::TaskNotFound(task_id))
    }

    pub fn add_task(&mut self, name: &str, input: EstimateInput) -> StoreResult<i32> {
        let id = self.allocate_id();
        self.append(Task::with_estimate(id, name, input))?;
        Ok(id)
    }

    pub fn add_empty_task(&mut self) -> StoreResult<i32> {
        self.add_task("", EstimateInput::default())
    }

    /// New task titled after the candidate, estimates left blank.
    pub fn add_imported(&mut self, candidate: &ImportedTaskCandidate) -> StoreResult<i32> {
        let id = self.allocate_id();
        let mut task = Task::new(id, candidate.title.clone());
        task.original_id = Some(candidate.external_id.clone());
        self.append(task)?;
        Ok(id)
    }

    /// Appends a task that carries a caller-chosen external id.
    pub fn add_with_original_id(
        &mut self,
        name: &str,
        input: EstimateInput,
        original_id: Option<String>,
    ) -> StoreResult<i32> {
        let id = self.allocate_id();
        let mut task = Task::with_estimate(id, name, input);
        task.original_id = original_id;
        self.append(task)?;
        Ok(id)
    }

    pub fn update_name(&mut self, task_id: i32, name: &str) -> StoreResult<()> {
        self.ensure_exists(task_id)?;
        self.update_string_column("name", task_id, name)?;
        tracing::debug!(task_id, "renamed task");
        Ok(())
    }

    pub fn update_estimate_field(
        &mut self,
        task_id: i32,
        field: EstimateField,
        value: &str,
    ) -> StoreResult<()> {
        self.ensure_exists(task_id)?;
        self.update_string_column(field.column(), task_id, value)?;
        tracing::debug!(task_id, field = %field, "updated estimate field");
        Ok(())
    }

    pub fn set_estimate(&mut self, task_id: i32, input: &EstimateInput) -> StoreResult<()> {
        self.ensure_exists(task_id)?;
        self.update_string_column("optimistic", task_id, &input.optimistic)?;
        self.update_string_column("most_likely", task_id, &input.most_likely)?;
        self.update_string_column("pessimistic", task_id, &input.pessimistic)?;
        tracing::debug!(task_id, "replaced estimate");
        Ok(())
    }

    /// Returns `false` when no task has the id.
    pub fn delete_task(&mut self, task_id: i32) -> StoreResult<bool> {
        if !self.contains(task_id)? {
            return Ok(false);
        }
        let mask = self
            .df
            .column("id")?
            .i32()?
            .into_iter()
            .map(|id| id != Some(task_id))
            .collect::<BooleanChunked>();
        self.df = self.df.filter(&mask)?;
        tracing::debug!(task_id, remaining = self.df.height(), "deleted task");
        Ok(true)
    }

    /// Drops every task. The id counter keeps running.
    pub fn clear(&mut self) {
        self.df = DataFrame::empty_with_schema(&Self::default_schema());
    }

    fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn append(&mut self, task: Task) -> StoreResult<()> {
        let new_row = task.to_dataframe_row()?;
        self.df = self.df.vstack(&new_row)?;
        tracing::debug!(task_id = task.id, rows = self.df.height(), "appended task");
        Ok(())
    }

    fn ensure_exists(&self, task_id: i32) -> StoreResult<()> {
        if self.contains(task_id)? {
            Ok(())
        } else {
            Err(StoreError::TaskNotFound(task_id))
        }
    }

    fn row_index(&self, task_id: i32) -> Result<Option<usize>, PolarsError> {
        if self.df.height() == 0 {
            return Ok(None);
        }
        let ids = self.df.column("id")?.i32()?;
        Ok(ids.into_iter().position(|id| id == Some(task_id)))
    }

    fn update_string_column(
        &mut self,
        column_name: &str,
        task_id: i32,
        new_value: &str,
    ) -> Result<(), PolarsError> {
        let id_col = self.df.column("id")?;
        let target_col = self.df.column(column_name)?;

        let new_series = target_col
            .str()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| {
                if id == Some(task_id) {
                    Some(new_value)
                } else {
                    val
                }
            })
            .collect::<StringChunked>()
            .into_series()
            .with_name(column_name.into());

        self.df.replace(column_name, new_series)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_contains_expected_columns() {
        let schema = TaskStore::default_schema();
        for name in [
            "id",
            "name",
            "optimistic",
            "most_likely",
            "pessimistic",
            "original_id",
        ] {
            assert!(schema.contains(name.into()), "missing column {name}");
        }
    }

    #[test]
    fn update_string_column_touches_only_target_row() {
        let mut store = TaskStore::new();
        let a = store.add_task("A", EstimateInput::new("1", "2", "3")).unwrap();
        let b = store.add_task("B", EstimateInput::new("4", "5", "6")).unwrap();

        store.update_name(b, "B2").unwrap();

        let df = store.dataframe();
        let names = df.column("name").unwrap().str().unwrap();
        assert_eq!(names.get(0), Some("A"));
        assert_eq!(names.get(1), Some("B2"));
        assert_eq!(store.find_task(a).unwrap().unwrap().name, "A");
    }
}
