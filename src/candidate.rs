use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const TAG_DELIMITER: char = ';';
pub const UNASSIGNED: &str = "Unassigned";
pub const UNKNOWN_STATE: &str = "Unknown";

/// A work item read from an external export, not yet turned into a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedTaskCandidate {
    pub external_id: String,
    pub work_item_type: String,
    pub title: String,
    pub assigned_to: String,
    pub state: String,
    /// Raw `;`-delimited list, kept exactly as read.
    pub tags: String,
}

impl ImportedTaskCandidate {
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(TAG_DELIMITER)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag_list()
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(tag.trim()))
    }
}

/// Keeps only the part before `<` of `Name <mail@host>`; blank becomes `Unassigned`.
pub fn normalize_assignee(raw: Option<&str>) -> String {
    let value = raw.unwrap_or("");
    let name = match value.find('<') {
        Some(pos) => &value[..pos],
        None => value,
    }
    .trim();
    if name.is_empty() {
        UNASSIGNED.to_string()
    } else {
        name.to_string()
    }
}

pub fn normalize_state(raw: Option<&str>) -> String {
    match raw {
        Some(state) if !state.trim().is_empty() => state.to_string(),
        _ => UNKNOWN_STATE.to_string(),
    }
}

/// Search and facet filter over the current candidate list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub work_item_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl CandidateFilter {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, candidate: &ImportedTaskCandidate) -> bool {
        if let Some(kind) = non_blank(&self.work_item_type) {
            if !candidate.work_item_type.eq_ignore_ascii_case(kind) {
                return false;
            }
        }
        if let Some(state) = non_blank(&self.state) {
            if !candidate.state.eq_ignore_ascii_case(state) {
                return false;
            }
        }
        match non_blank(&self.search) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                [
                    candidate.external_id.as_str(),
                    candidate.title.as_str(),
                    candidate.assigned_to.as_str(),
                    candidate.tags.as_str(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }

    /// Indices into `candidates` of every match, in list order.
    pub fn apply(&self, candidates: &[ImportedTaskCandidate]) -> Vec<usize> {
        candidates
            .iter()
            .enumerate()
            .filter(|(_, candidate)| self.matches(candidate))
            .map(|(idx, _)| idx)
            .collect()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn work_item_types(candidates: &[ImportedTaskCandidate]) -> Vec<String> {
    distinct(candidates.iter().map(|c| c.work_item_type.as_str()))
}

pub fn states(candidates: &[ImportedTaskCandidate]) -> Vec<String> {
    distinct(candidates.iter().map(|c| c.state.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.trim().is_empty())
        .map(ToOwned::to_owned)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
