use crate::estimate::{EstimateInput, EstimateResult};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub optimistic: String,
    #[serde(default)]
    pub most_likely: String,
    #[serde(default)]
    pub pessimistic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,
}

/// One of the three editable estimate columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateField {
    Optimistic,
    MostLikely,
    Pessimistic,
}

impl EstimateField {
    pub fn column(&self) -> &'static str {
        match self {
            EstimateField::Optimistic => "optimistic",
            EstimateField::MostLikely => "most_likely",
            EstimateField::Pessimistic => "pessimistic",
        }
    }
}

impl fmt::Display for EstimateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for EstimateField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "o" | "opt" | "optimistic" => Ok(EstimateField::Optimistic),
            "m" | "ml" | "most_likely" | "mostlikely" => Ok(EstimateField::MostLikely),
            "p" | "pess" | "pessimistic" => Ok(EstimateField::Pessimistic),
            other => Err(format!("unknown estimate field '{other}'")),
        }
    }
}

impl Task {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            optimistic: String::new(),
            most_likely: String::new(),
            pessimistic: String::new(),
            original_id: None,
        }
    }

    pub fn with_estimate(id: i32, name: impl Into<String>, input: EstimateInput) -> Self {
        let mut task = Self::new(id, name);
        task.set_estimate(input);
        task
    }

    pub fn estimate_input(&self) -> EstimateInput {
        EstimateInput::new(
            self.optimistic.clone(),
            self.most_likely.clone(),
            self.pessimistic.clone(),
        )
    }

    pub fn set_estimate(&mut self, input: EstimateInput) {
        self.optimistic = input.optimistic;
        self.most_likely = input.most_likely;
        self.pessimistic = input.pessimistic;
    }

    /// Recomputed on every call; never cached on the record.
    pub fn estimate(&self) -> EstimateResult {
        crate::estimate::calculate(&self.optimistic, &self.most_likely, &self.pessimistic)
    }

    /// Identifier shown to users: the external work-item id when imported.
    pub fn display_id(&self) -> String {
        self.original_id
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn to_dataframe_row(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(6);

        let id_data: [i32; 1] = [self.id];
        columns.push(Series::new(PlSmallStr::from_static("id"), id_data).into_column());

        let name_data: [&str; 1] = [self.name.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("name"), name_data).into_column());

        let optimistic: [&str; 1] = [self.optimistic.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("optimistic"), optimistic).into_column());

        let most_likely: [&str; 1] = [self.most_likely.as_str()];
        columns
            .push(Series::new(PlSmallStr::from_static("most_likely"), most_likely).into_column());

        let pessimistic: [&str; 1] = [self.pessimistic.as_str()];
        columns
            .push(Series::new(PlSmallStr::from_static("pessimistic"), pessimistic).into_column());

        let original_id: [Option<&str>; 1] = [self.original_id.as_deref()];
        columns
            .push(Series::new(PlSmallStr::from_static("original_id"), original_id).into_column());

        DataFrame::new(columns)
    }

    pub fn from_dataframe_row(df: &DataFrame, row_idx: usize) -> PolarsResult<Self> {
        let id = df
            .column("id")?
            .i32()?
            .get(row_idx)
            .ok_or_else(|| PolarsError::ComputeError("task row missing id".into()))?;

        Ok(Self {
            id,
            name: Self::string_at(df, "name", row_idx)?,
            optimistic: Self::string_at(df, "optimistic", row_idx)?,
            most_likely: Self::string_at(df, "most_likely", row_idx)?,
            pessimistic: Self::string_at(df, "pessimistic", row_idx)?,
            original_id: df
                .column("original_id")?
                .str()?
                .get(row_idx)
                .map(ToOwned::to_owned),
        })
    }

    fn string_at(df: &DataFrame, column: &str, row_idx: usize) -> PolarsResult<String> {
        Ok(df
            .column(column)?
            .str()?
            .get(row_idx)
            .unwrap_or("")
            .to_string())
    }
}
