use crate::config::{Config, Grade, GradeScale, ModuleSpec, MAX_POINTS};
use crate::ledger::Ledger;
use crate::models::ScoredStudent;

pub fn evaluate(ledger: &Ledger, config: &Config) -> Vec<ScoredStudent> {
    ledger
        .students
        .iter()
        .map(|row| ScoredStudent {
            index: row.index,
            grades: row.grades.clone(),
            current_gpa: current_gpa(
                &row.grades,
                &ledger.available,
                &config.scale,
                ledger.available_credits,
            ),
            virtual_gpa: virtual_gpa(
                &row.grades,
                &ledger.available,
                &config.scale,
                ledger.available_credits,
            ),
            max_possible_gpa: max_possible_gpa(
                &row.grades,
                &ledger.available,
                &config.scale,
                config.total_credits,
            ),
        })
        .collect()
}

/// Weighted average over available modules on the 4.0-capped scale.
pub fn current_gpa(
    grades: &[Grade],
    modules: &[ModuleSpec],
    scale: &GradeScale,
    available_credits: u32,
) -> f64 {
    let product: f64 = modules
        .iter()
        .zip(grades)
        .map(|(m, &g)| m.credits as f64 * scale.real_points(g))
        .sum();
    round2(product / available_credits as f64)
}

/// Weighted average on the extended scale, left unrounded so downstream
/// tie-breaking sees full precision.
pub fn virtual_gpa(
    grades: &[Grade],
    modules: &[ModuleSpec],
    scale: &GradeScale,
    available_credits: u32,
) -> f64 {
    let product: f64 = modules
        .iter()
        .zip(grades)
        .map(|(m, &g)| m.credits as f64 * scale.virtual_points(g))
        .sum();
    product / available_credits as f64
}

/// Best achievable final GPA: every credit not yet graded scores the maximum,
/// and already-graded credits keep their deficit against 4.0.
pub fn max_possible_gpa(
    grades: &[Grade],
    modules: &[ModuleSpec],
    scale: &GradeScale,
    total_credits: u32,
) -> f64 {
    let deficit: f64 = modules
        .iter()
        .zip(grades)
        .map(|(m, &g)| m.credits as f64 * (MAX_POINTS - scale.real_points(g)))
        .sum();
    round2(MAX_POINTS - deficit / total_credits as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::parse(
            r#"{
                "course": "mpr",
                "results_dir": "results",
                "roster_path": "students.json",
                "modules": [
                    { "id": "MA1014", "credits": 2 },
                    { "id": "CS1033", "credits": 2 }
                ],
                "grades": [
                    { "symbol": "A+", "points": 4.2 },
                    { "symbol": "A", "points": 4.0 },
                    { "symbol": "B", "points": 3.0 },
                    { "symbol": "W", "points": 0.0 }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn top_grade_caps_current_but_not_virtual() {
        let config = test_config();
        let top = config.scale.resolve("A+").unwrap();
        let grades = vec![top, top];

        let current = current_gpa(&grades, &config.modules, &config.scale, 4);
        let virtual_ = virtual_gpa(&grades, &config.modules, &config.scale, 4);
        assert_eq!(current, 4.0);
        assert!((virtual_ - 4.2).abs() < 1e-9);
    }

    #[test]
    fn current_gpa_rounds_to_two_decimals() {
        let config = test_config();
        let a = config.scale.resolve("A").unwrap();
        let b = config.scale.resolve("B").unwrap();
        // (2*4.0 + 2*3.0) / 4 = 3.5
        let grades = vec![a, b];
        assert_eq!(
            current_gpa(&grades, &config.modules, &config.scale, 4),
            3.5
        );

        // Uneven weights: (3*4.0 + 2*3.0) / 5 = 3.6, (3*3.0 + 2*4.0) / 5 = 3.4
        let modules = vec![
            ModuleSpec {
                id: "MA1014".to_string(),
                credits: 3,
            },
            ModuleSpec {
                id: "CS1033".to_string(),
                credits: 2,
            },
        ];
        assert_eq!(current_gpa(&grades, &modules, &config.scale, 5), 3.6);
        assert_eq!(
            current_gpa(&[b, a], &modules, &config.scale, 5),
            3.4
        );

        // (2*4.0 + 1*3.0) / 3 = 3.666... -> 3.67
        let modules = vec![
            ModuleSpec {
                id: "MA1014".to_string(),
                credits: 2,
            },
            ModuleSpec {
                id: "CS1033".to_string(),
                credits: 1,
            },
        ];
        assert_eq!(current_gpa(&grades, &modules, &config.scale, 3), 3.67);
    }

    #[test]
    fn max_possible_credits_ungraded_modules_at_maximum() {
        let config = test_config();
        let b = config.scale.resolve("B").unwrap();
        // Only MA1014 graded (credits 2 of 4 total): 4.0 - 2*(4.0-3.0)/4 = 3.5
        let available = &config.modules[..1];
        let max = max_possible_gpa(&[b], available, &config.scale, config.total_credits);
        assert_eq!(max, 3.5);

        let current = current_gpa(&[b], available, &config.scale, 2);
        assert!(max >= current);
    }

    #[test]
    fn max_possible_never_below_current() {
        let config = test_config();
        let symbols = ["A+", "A", "B", "W"];
        for first in symbols {
            for second in symbols {
                let grades = vec![
                    config.scale.resolve(first).unwrap(),
                    config.scale.resolve(second).unwrap(),
                ];
                let current = current_gpa(&grades, &config.modules, &config.scale, 4);
                let max = max_possible_gpa(
                    &grades,
                    &config.modules,
                    &config.scale,
                    config.total_credits,
                );
                assert!(
                    max >= current,
                    "{first}/{second}: max {max} < current {current}"
                );
            }
        }
    }
}
