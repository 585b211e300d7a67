use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RankError, Result};
use crate::models::RosterEntry;

/// Ceiling of the real (capped) GPA scale.
pub const MAX_POINTS: f64 = 4.0;

const TOP_SYMBOL: &str = "A+";
const CAP_SYMBOL: &str = "A";
const WITHDRAWN_SYMBOL: &str = "W";

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleSpec {
    pub id: String,
    pub credits: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GradeSpec {
    pub symbol: String,
    pub points: f64,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    course: String,
    results_dir: PathBuf,
    roster_path: PathBuf,
    modules: Vec<ModuleSpec>,
    grades: Vec<GradeSpec>,
    #[serde(default)]
    include_absentees: bool,
}

/// Run configuration, validated once at startup and shared by reference
/// with every stage of the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub course: String,
    pub results_dir: PathBuf,
    pub roster_path: PathBuf,
    /// Module declaration order doubles as the tie-break order.
    pub modules: Vec<ModuleSpec>,
    pub scale: GradeScale,
    /// Whole-cohort default policy: roster indexes with no reported grade at
    /// all enter the ledger as withdrawn in every available module.
    pub include_absentees: bool,
    pub total_credits: u32,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let raw = fs::read_to_string(path)?;
        Config::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Config> {
        let raw: RawConfig = serde_json::from_str(raw)?;

        if raw.modules.is_empty() {
            return Err(RankError::Config("no modules declared".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for module in &raw.modules {
            if module.credits == 0 {
                return Err(RankError::Config(format!(
                    "module {} has zero credits",
                    module.id
                )));
            }
            if !seen.insert(module.id.as_str()) {
                return Err(RankError::Config(format!(
                    "module {} declared twice",
                    module.id
                )));
            }
        }

        let scale = GradeScale::new(raw.grades)?;
        let total_credits = raw.modules.iter().map(|m| m.credits).sum();

        Ok(Config {
            course: raw.course,
            results_dir: raw.results_dir,
            roster_path: raw.roster_path,
            modules: raw.modules,
            scale,
            include_absentees: raw.include_absentees,
            total_credits,
        })
    }
}

/// Handle into the validated grade scale. Constructed only by
/// [`GradeScale::resolve`], so point lookups never fail after ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Grade(usize);

impl Grade {
    pub(crate) fn idx(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct GradeScale {
    entries: Vec<GradeSpec>,
    real: Vec<f64>,
    withdrawn: Grade,
}

impl GradeScale {
    pub fn new(entries: Vec<GradeSpec>) -> Result<GradeScale> {
        if entries.is_empty() {
            return Err(RankError::Config("no grades declared".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for grade in &entries {
            if !seen.insert(grade.symbol.as_str()) {
                return Err(RankError::Config(format!(
                    "grade {} declared twice",
                    grade.symbol
                )));
            }
        }

        // The top grade carries an extended point value; its real value is
        // capped at the plain-A entry.
        let cap = match entries.iter().find(|g| g.symbol == CAP_SYMBOL) {
            Some(cap) => cap.points,
            None if entries.iter().any(|g| g.symbol == TOP_SYMBOL) => {
                return Err(RankError::Config(format!(
                    "scale declares {TOP_SYMBOL} but no {CAP_SYMBOL} to cap it at"
                )));
            }
            None => MAX_POINTS,
        };
        let real = entries
            .iter()
            .map(|g| if g.symbol == TOP_SYMBOL { cap } else { g.points })
            .collect();

        let withdrawn = entries
            .iter()
            .position(|g| g.symbol == WITHDRAWN_SYMBOL)
            .map(Grade)
            .ok_or_else(|| {
                RankError::Config(format!(
                    "scale declares no {WITHDRAWN_SYMBOL} grade for defaulted students"
                ))
            })?;

        Ok(GradeScale {
            entries,
            real,
            withdrawn,
        })
    }

    /// Validates a raw symbol against the scale. Every grade entering the
    /// ledger passes through here once; `None` is fatal at the call site.
    pub fn resolve(&self, symbol: &str) -> Option<Grade> {
        self.entries
            .iter()
            .position(|g| g.symbol == symbol)
            .map(Grade)
    }

    pub fn symbol(&self, grade: Grade) -> &str {
        &self.entries[grade.0].symbol
    }

    /// Point value on the extended scale (top grade above 4.0).
    pub fn virtual_points(&self, grade: Grade) -> f64 {
        self.entries[grade.0].points
    }

    /// Point value with the top grade capped at 4.0.
    pub fn real_points(&self, grade: Grade) -> f64 {
        self.real[grade.0]
    }

    pub fn withdrawn(&self) -> Grade {
        self.withdrawn
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|g| g.symbol.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Roster for one course: display details per index plus the contiguous
/// index range that bounds ingestion.
#[derive(Debug, Clone)]
pub struct Roster {
    pub entries: HashMap<u32, RosterEntry>,
    pub index_start: u32,
    pub index_end: u32,
}

pub fn load_roster(path: &Path, course: &str) -> Result<Roster> {
    let raw = fs::read_to_string(path)?;
    let mut courses: HashMap<String, Vec<RosterEntry>> = serde_json::from_str(&raw)?;
    let entries = courses
        .remove(course)
        .filter(|list| !list.is_empty())
        .ok_or_else(|| RankError::MissingRoster(course.to_string()))?;

    let index_start = entries.iter().map(|e| e.index).min().unwrap_or(0);
    let index_end = entries.iter().map(|e| e.index).max().unwrap_or(0);
    let entries = entries.into_iter().map(|e| (e.index, e)).collect();

    Ok(Roster {
        entries,
        index_start,
        index_end,
    })
}
