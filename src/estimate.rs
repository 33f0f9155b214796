use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw three-point estimate as typed into the form. Any field may be empty or
/// non-numeric while the user is still editing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateInput {
    #[serde(default)]
    pub optimistic: String,
    #[serde(default)]
    pub most_likely: String,
    #[serde(default)]
    pub pessimistic: String,
}

impl EstimateInput {
    pub fn new(
        optimistic: impl Into<String>,
        most_likely: impl Into<String>,
        pessimistic: impl Into<String>,
    ) -> Self {
        Self {
            optimistic: optimistic.into(),
            most_likely: most_likely.into(),
            pessimistic: pessimistic.into(),
        }
    }

    /// Returns `None` when any of the three fields is blank or not a finite number.
    pub fn parse(&self) -> Option<ThreePointEstimate> {
        Some(ThreePointEstimate {
            optimistic: parse_hours(&self.optimistic)?,
            most_likely: parse_hours(&self.most_likely)?,
            pessimistic: parse_hours(&self.pessimistic)?,
        })
    }

    pub fn result(&self) -> EstimateResult {
        self.parse()
            .map(|estimate| estimate.result())
            .unwrap_or(EstimateResult::Undefined)
    }

    pub fn is_blank(&self) -> bool {
        self.optimistic.trim().is_empty()
            && self.most_likely.trim().is_empty()
            && self.pessimistic.trim().is_empty()
    }
}

/// Parsed estimate in hours. Ordering of the three values is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreePointEstimate {
    pub optimistic: f64,
    pub most_likely: f64,
    pub pessimistic: f64,
}

impl ThreePointEstimate {
    pub fn new(optimistic: f64, most_likely: f64, pessimistic: f64) -> Self {
        Self {
            optimistic,
            most_likely,
            pessimistic,
        }
    }

    pub fn expected(&self) -> f64 {
        (self.optimistic + 4.0 * self.most_likely + self.pessimistic) / 6.0
    }

    /// Negative when pessimistic < optimistic; passed through as-is.
    pub fn std_dev(&self) -> f64 {
        (self.pessimistic - self.optimistic) / 6.0
    }

    pub fn result(&self) -> EstimateResult {
        EstimateResult::Defined {
            expected: self.expected(),
            std_dev: self.std_dev(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EstimateResult {
    Defined { expected: f64, std_dev: f64 },
    Undefined,
}

impl EstimateResult {
    pub fn is_defined(&self) -> bool {
        matches!(self, EstimateResult::Defined { .. })
    }

    pub fn expected(&self) -> Option<f64> {
        match self {
            EstimateResult::Defined { expected, .. } => Some(*expected),
            EstimateResult::Undefined => None,
        }
    }

    pub fn std_dev(&self) -> Option<f64> {
        match self {
            EstimateResult::Defined { std_dev, .. } => Some(*std_dev),
            EstimateResult::Undefined => None,
        }
    }

    pub fn variance(&self) -> Option<f64> {
        self.std_dev().map(|sd| sd * sd)
    }

    pub fn expected_display(&self) -> String {
        format_hours(self.expected())
    }

    pub fn std_dev_display(&self) -> String {
        format_hours(self.std_dev())
    }
}

impl fmt::Display for EstimateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateResult::Defined { expected, std_dev } => {
                write!(f, "{expected:.2} ± {std_dev:.2}")
            }
            EstimateResult::Undefined => write!(f, "{UNDEFINED_MARKER}"),
        }
    }
}

/// Rendered in place of a value when the estimate is incomplete.
pub const UNDEFINED_MARKER: &str = "-";

/// Presentation rounding: two decimals, or the undefined marker.
pub fn format_hours(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => UNDEFINED_MARKER.to_string(),
    }
}

pub fn calculate(
    optimistic: impl AsRef<str>,
    most_likely: impl AsRef<str>,
    pessimistic: impl AsRef<str>,
) -> EstimateResult {
    match (
        parse_hours(optimistic.as_ref()),
        parse_hours(most_likely.as_ref()),
        parse_hours(pessimistic.as_ref()),
    ) {
        (Some(o), Some(m), Some(p)) => ThreePointEstimate::new(o, m, p).result(),
        _ => EstimateResult::Undefined,
    }
}

fn parse_hours(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
