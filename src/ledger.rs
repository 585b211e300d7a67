use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;

use crate::config::{Config, Grade, GradeScale, ModuleSpec, Roster};
use crate::error::{RankError, Result};
use crate::models::{CohortRow, GradeDistribution};

/// Fully reconciled grade table: every student row carries exactly one grade
/// per available module, so the GPA and ranking stages never see a gap.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Rows in ascending index order.
    pub students: Vec<CohortRow>,
    /// Configured modules whose results sheet existed, in declaration order.
    pub available: Vec<ModuleSpec>,
    pub available_credits: u32,
    /// Per-module grade counts, parallel to `available`.
    pub distribution: Vec<GradeDistribution>,
}

pub fn build(config: &Config, roster: &Roster) -> Result<Ledger> {
    let mut rows: BTreeMap<u32, HashMap<String, Grade>> = BTreeMap::new();
    let mut available = Vec::new();
    let mut distribution = Vec::new();

    for module in &config.modules {
        let path = config.results_dir.join(format!("{}.csv", module.id));
        if !path.is_file() {
            eprintln!(
                "warning: no results sheet for {} at {}, module treated as ungraded",
                module.id,
                path.display()
            );
            continue;
        }
        println!("Reading {}...", path.display());
        let file = File::open(&path)?;
        let dist = ingest_sheet(file, module, &config.scale, roster, &mut rows)?;
        available.push(module.clone());
        distribution.push(dist);
    }

    let w = config.scale.withdrawn();

    // Whole-cohort default: roster indexes that reported nothing at all enter
    // as withdrawn everywhere, and these defaults do show up in the
    // distribution table.
    if config.include_absentees {
        for index in roster.index_start..=roster.index_end {
            if rows.contains_key(&index) {
                continue;
            }
            let row = rows.entry(index).or_default();
            for (pos, module) in available.iter().enumerate() {
                row.insert(module.id.clone(), w);
                distribution[pos].bump(w);
            }
        }
    }

    // Partial-record default: a tracked student missing some sheet's entry
    // reads as withdrawn there, without touching the distribution counters.
    let students = rows
        .into_iter()
        .map(|(index, mut grades)| CohortRow {
            index,
            grades: available
                .iter()
                .map(|m| grades.remove(&m.id).unwrap_or(w))
                .collect(),
        })
        .collect();

    let available_credits = available.iter().map(|m| m.credits).sum();

    Ok(Ledger {
        students,
        available,
        available_credits,
        distribution,
    })
}

fn ingest_sheet<R: Read>(
    input: R,
    module: &ModuleSpec,
    scale: &GradeScale,
    roster: &Roster,
    rows: &mut BTreeMap<u32, HashMap<String, Grade>>,
) -> Result<GradeDistribution> {
    let mut dist = GradeDistribution::new(&module.id, scale.len());
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);

    for record in reader.records() {
        let record = record?;
        let raw_index = record.get(0).unwrap_or("");
        let raw_grade = record.get(1).unwrap_or("").trim();

        let index = match parse_index(raw_index) {
            Some(index) => index,
            None => continue,
        };
        if index < roster.index_start || index > roster.index_end {
            continue;
        }
        if raw_grade.is_empty() {
            continue;
        }

        let grade = scale.resolve(raw_grade).ok_or_else(|| RankError::UnknownGrade {
            module: module.id.clone(),
            index,
            symbol: raw_grade.to_string(),
        })?;
        rows.entry(index).or_default().insert(module.id.clone(), grade);
        dist.bump(grade);
    }

    Ok(dist)
}

/// Index strings carry a one-character checksum suffix ("200123X"), stripped
/// before parsing.
fn parse_index(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let last = raw.chars().last()?;
    let body = &raw[..raw.len() - last.len_utf8()];
    if body.is_empty() {
        return None;
    }
    body.parse().ok()
}
