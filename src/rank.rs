use std::cmp::Ordering;

use crate::config::GradeScale;
use crate::models::{RankedStudent, ScoredStudent};

/// Sorts the cohort into its total order and assigns both rank series in a
/// single forward pass.
///
/// Ranks follow 1224 competition ranking: everyone in a tie group shares the
/// group's rank, and the next distinct group starts at rank + group size.
/// The primary rank groups on current GPA alone; the battle rank groups on
/// (current, virtual) GPA and its counter advances cumulatively across
/// primary-group boundaries, giving a cohort-wide ranking on the 4.2 scale.
pub fn rank(mut students: Vec<ScoredStudent>, scale: &GradeScale) -> Vec<RankedStudent> {
    students.sort_by(|a, b| order(a, b, scale));

    let mut ranked = Vec::with_capacity(students.len());
    let mut prev_gpa = f64::NAN;
    let mut prev_vgpa = f64::NAN;
    let (mut rank, mut rank_gap) = (1usize, 0usize);
    let (mut brank, mut brank_gap) = (1usize, 0usize);

    for student in students {
        if student.current_gpa == prev_gpa {
            rank_gap += 1;
            if student.virtual_gpa == prev_vgpa {
                brank_gap += 1;
            } else {
                brank += brank_gap;
                brank_gap = 1;
                prev_vgpa = student.virtual_gpa;
            }
        } else {
            rank += rank_gap;
            brank += brank_gap;
            rank_gap = 1;
            brank_gap = 1;
            prev_gpa = student.current_gpa;
            prev_vgpa = student.virtual_gpa;
        }
        ranked.push(RankedStudent {
            rank,
            battle_rank: brank,
            student,
        });
    }

    ranked
}

/// Total order for the ranking: current GPA, then virtual GPA, then each
/// available module's extended points in declaration order (harder subjects
/// break ties grade for grade), all descending; the lower roster index wins
/// whatever survives.
fn order(a: &ScoredStudent, b: &ScoredStudent, scale: &GradeScale) -> Ordering {
    desc(a.current_gpa, b.current_gpa)
        .then_with(|| desc(a.virtual_gpa, b.virtual_gpa))
        .then_with(|| {
            for (&ga, &gb) in a.grades.iter().zip(&b.grades) {
                let cmp = desc(scale.virtual_points(ga), scale.virtual_points(gb));
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
            Ordering::Equal
        })
        .then_with(|| a.index.cmp(&b.index))
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
