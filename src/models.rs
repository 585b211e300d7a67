use serde::Deserialize;

use crate::config::Grade;

#[derive(Debug, Clone, Deserialize)]
pub struct RosterEntry {
    pub index: u32,
    pub full_index: String,
    pub name: String,
    pub group: String,
}

/// One student's reconciled grades, parallel to the ledger's available
/// module list.
#[derive(Debug, Clone)]
pub struct CohortRow {
    pub index: u32,
    pub grades: Vec<Grade>,
}

/// Per-module count of students per grade symbol, parallel to the scale.
#[derive(Debug, Clone)]
pub struct GradeDistribution {
    pub module: String,
    pub counts: Vec<usize>,
}

impl GradeDistribution {
    pub fn new(module: &str, scale_len: usize) -> GradeDistribution {
        GradeDistribution {
            module: module.to_string(),
            counts: vec![0; scale_len],
        }
    }

    pub fn bump(&mut self, grade: Grade) {
        self.counts[grade.idx()] += 1;
    }

    pub fn count(&self, grade: Grade) -> usize {
        self.counts[grade.idx()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone)]
pub struct ScoredStudent {
    pub index: u32,
    pub grades: Vec<Grade>,
    /// Weighted average on the 4.0-capped scale, rounded to 2 decimals.
    pub current_gpa: f64,
    /// Weighted average on the extended scale, full precision for tie-breaks.
    pub virtual_gpa: f64,
    /// Best achievable final GPA if every ungraded module scores the maximum.
    pub max_possible_gpa: f64,
}

#[derive(Debug, Clone)]
pub struct RankedStudent {
    pub student: ScoredStudent,
    /// Competition rank on current GPA.
    pub rank: usize,
    /// Competition rank on (current, virtual) GPA across the whole cohort.
    pub battle_rank: usize,
}
