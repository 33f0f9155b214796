use crate::estimate::EstimateResult;
use crate::task::Task;
use serde::{Deserialize, Serialize};

/// A named z-multiple of the project standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceLevel {
    pub label: String,
    pub z: f64,
}

impl ConfidenceLevel {
    pub fn new(label: impl Into<String>, z: f64) -> Self {
        Self {
            label: label.into(),
            z,
        }
    }

    pub fn defaults() -> Vec<ConfidenceLevel> {
        vec![
            ConfidenceLevel::new("68%", 1.0),
            ConfidenceLevel::new("95%", 2.0),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub label: String,
    pub z: f64,
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub total_tasks: usize,
    pub estimated_tasks: usize,
    pub total_expected: f64,
    pub total_variance: f64,
    pub total_std_dev: f64,
    pub intervals: Vec<ConfidenceInterval>,
}

impl ProjectSummary {
    pub fn from_tasks(tasks: &[Task], levels: &[ConfidenceLevel]) -> Self {
        Self::from_results(tasks.iter().map(Task::estimate), levels)
    }

    /// Undefined results are counted in `total_tasks` but add nothing to the totals.
    pub fn from_results<I>(results: I, levels: &[ConfidenceLevel]) -> Self
    where
        I: IntoIterator<Item = EstimateResult>,
    {
        let mut total_tasks = 0usize;
        let mut estimated_tasks = 0usize;
        let mut total_expected = 0.0;
        let mut total_variance = 0.0;

        for result in results {
            total_tasks += 1;
            if let EstimateResult::Defined { expected, std_dev } = result {
                estimated_tasks += 1;
                total_expected += expected;
                total_variance += std_dev * std_dev;
            }
        }

        let total_std_dev = total_variance.sqrt();
        let mut summary = Self {
            total_tasks,
            estimated_tasks,
            total_expected,
            total_variance,
            total_std_dev,
            intervals: Vec::with_capacity(levels.len()),
        };
        summary.intervals = levels
            .iter()
            .map(|level| {
                let interval = summary.interval_at(level.z);
                ConfidenceInterval {
                    label: level.label.clone(),
                    z: level.z,
                    low: interval.low,
                    high: interval.high,
                }
            })
            .collect();
        summary
    }

    pub fn interval_at(&self, z: f64) -> Interval {
        let spread = z * self.total_std_dev;
        Interval {
            low: self.total_expected - spread,
            high: self.total_expected + spread,
        }
    }

    pub fn ci68(&self) -> Interval {
        self.interval_at(1.0)
    }

    pub fn ci95(&self) -> Interval {
        self.interval_at(2.0)
    }

    pub fn interval(&self, label: &str) -> Option<&ConfidenceInterval> {
        self.intervals.iter().find(|ci| ci.label == label)
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.total_tasks));
        parts.push(format!("estimated={}", self.estimated_tasks));
        parts.push(format!("expected={:.2}h", self.total_expected));
        parts.push(format!("std_dev={:.2}h", self.total_std_dev));
        for ci in &self.intervals {
            parts.push(format!("{}=[{:.2}, {:.2}]", ci.label, ci.low, ci.high));
        }
        parts.join(", ")
    }
}
