use std::path::{Path, PathBuf};

use crate::config::{Config, Roster};
use crate::error::Result;
use crate::ledger::Ledger;
use crate::models::RankedStudent;

/// Writes the two result analysis spreadsheets and returns their paths.
pub fn export(
    out_dir: &Path,
    config: &Config,
    roster: &Roster,
    ledger: &Ledger,
    ranked: &[RankedStudent],
) -> Result<(PathBuf, PathBuf)> {
    let course = config.course.to_uppercase();
    let compact = out_dir.join(format!("{course} - Result Analysis.csv"));
    let extended = out_dir.join(format!("{course} - Result Analysis (extended).csv"));

    write_report(&compact, config, roster, ledger, ranked, false)?;
    write_report(&extended, config, roster, ledger, ranked, true)?;
    Ok((compact, extended))
}

fn write_report(
    path: &Path,
    config: &Config,
    roster: &Roster,
    ledger: &Ledger,
    ranked: &[RankedStudent],
    extended: bool,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    for row in student_rows(config, roster, ledger, ranked, extended) {
        writer.write_record(&row)?;
    }
    writer.write_record([""])?;
    for row in distribution_rows(config, ledger) {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn student_rows(
    config: &Config,
    roster: &Roster,
    ledger: &Ledger,
    ranked: &[RankedStudent],
    extended: bool,
) -> Vec<Vec<String>> {
    let all_graded = ledger.available.len() == config.modules.len();
    let mut rows = Vec::with_capacity(ranked.len() + 1);

    let mut header = vec!["Rank".to_string(), "Index".to_string()];
    if extended {
        header.push("Name".to_string());
        header.push("Group".to_string());
    }
    header.extend(ledger.available.iter().map(|m| m.id.clone()));
    header.push(if all_graded { "SGPA" } else { "Current SGPA" }.to_string());
    if !all_graded {
        header.push("Maximum Possible SGPA".to_string());
    }
    if extended {
        header.push("Battle Rank (4.2 GPA scale)".to_string());
    }
    rows.push(header);

    for entry in ranked {
        let mut row = vec![entry.rank.to_string()];
        match roster.entries.get(&entry.student.index) {
            Some(details) => {
                row.push(details.full_index.clone());
                if extended {
                    row.push(details.name.clone());
                    row.push(details.group.clone());
                }
            }
            // Ranked but unknown to the roster: keep the row rather than
            // dropping a computed result.
            None => {
                row.push(entry.student.index.to_string());
                if extended {
                    row.push(String::new());
                    row.push(String::new());
                }
            }
        }
        for &grade in &entry.student.grades {
            row.push(config.scale.symbol(grade).to_string());
        }
        row.push(format!("{:.2}", entry.student.current_gpa));
        if !all_graded {
            row.push(format!("{:.2}", entry.student.max_possible_gpa));
        }
        if extended {
            row.push(entry.battle_rank.to_string());
        }
        rows.push(row);
    }

    rows
}

/// One row per scale symbol, one column per available module,
/// cell = "count(percentage%)".
fn distribution_rows(config: &Config, ledger: &Ledger) -> Vec<Vec<String>> {
    let totals: Vec<usize> = ledger.distribution.iter().map(|d| d.total()).collect();

    let mut header = vec!["Grade".to_string()];
    header.extend(ledger.distribution.iter().map(|d| d.module.clone()));

    let mut rows = vec![header];
    for (pos, symbol) in config.scale.symbols().enumerate() {
        let mut row = vec![symbol.to_string()];
        for (dist, &total) in ledger.distribution.iter().zip(&totals) {
            let count = dist.counts[pos];
            let pct = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            row.push(format!("{count}({pct:.1}%)"));
        }
        rows.push(row);
    }
    rows
}

/// Stdout listing for the `rank` subcommand.
pub fn print_top(ranked: &[RankedStudent], roster: &Roster, limit: usize) {
    if ranked.is_empty() {
        println!("No graded students in this run.");
        return;
    }

    println!("Top students by semester GPA:");
    for entry in ranked.iter().take(limit) {
        let (display, name) = match roster.entries.get(&entry.student.index) {
            Some(details) => (details.full_index.clone(), details.name.as_str()),
            None => (entry.student.index.to_string(), ""),
        };
        println!(
            "- #{} {} {} GPA {:.2} (max possible {:.2}, battle rank {})",
            entry.rank,
            display,
            name,
            entry.student.current_gpa,
            entry.student.max_possible_gpa,
            entry.battle_rank
        );
    }
}
