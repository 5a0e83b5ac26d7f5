//! Fixed-grid rubric of the beam workshop.
//!
//! Seven competencies are scored 0–5 on each of the five problems `1.a`–`1.e`
//! (25 points each), and two additional components are scored 0–5 once,
//! for a maximum of 185 points. The final grade is `5 × total / 185`.
//!
//! The grid is expressed as an ordinary [`Rubric`]: a competency row is an
//! item with the five problems as sub-items and weight 25, an additional
//! component is an item with a single sub-item and weight 5. With those
//! weights the weighted average reproduces the points-based formula.

use crate::error::Result;
use crate::rubric::{Rubric, RubricItem};
use crate::scoring::types::ScoreEntry;

pub const COMPETENCIES: [&str; 7] = [
    "C1: Diagrama de cuerpo libre",
    "C2: Reacciones en los apoyos",
    "C3: Función de singularidad",
    "C4: Función de carga cortante",
    "C5: Función de momento flector",
    "C6: Diagrama de momento flector",
    "C7: Diagrama de fuerza cortante",
];

pub const PROBLEMS: [&str; 5] = ["1.a", "1.b", "1.c", "1.d", "1.e"];

pub const ADDITIONAL: [&str; 2] = [
    "C8: Deflexión en viga (Punto 2)",
    "C9: Validación con Software (Punto 3)",
];

/// Sub-item name of the single cell of an additional component.
pub const ADDITIONAL_CELL: &str = "Puntaje";

pub const CELL_MAX: f64 = 5.0;
pub const COMPETENCY_MAX: f64 = CELL_MAX * PROBLEMS.len() as f64;
pub const MAX_SCORE: f64 =
    COMPETENCY_MAX * COMPETENCIES.len() as f64 + CELL_MAX * ADDITIONAL.len() as f64;

/// Builds the beam workshop rubric.
pub fn beam_workshop_rubric() -> Result<Rubric> {
    let problems: Vec<String> = PROBLEMS.iter().map(|p| p.to_string()).collect();

    let mut items: Vec<RubricItem> = COMPETENCIES
        .iter()
        .map(|c| RubricItem::new(*c, problems.clone(), COMPETENCY_MAX, COMPETENCY_MAX))
        .collect();
    items.extend(ADDITIONAL.iter().map(|c| {
        RubricItem::new(*c, vec![ADDITIONAL_CELL.to_string()], CELL_MAX, CELL_MAX)
    }));

    Rubric::new(items)
}

/// Short display name: the part after `"Cn: "`.
pub fn short_name(label: &str) -> &str {
    label.split_once(':').map_or(label, |(_, name)| name.trim())
}

/// Sum of every grid cell and additional component in `entry`.
pub fn raw_total(entry: &ScoreEntry) -> f64 {
    let grid: f64 = COMPETENCIES
        .iter()
        .flat_map(|c| PROBLEMS.iter().map(move |p| entry.score(c, p)))
        .sum();
    let additional: f64 = ADDITIONAL
        .iter()
        .map(|c| entry.score(c, ADDITIONAL_CELL))
        .sum();
    grid + additional
}

/// Sum of one competency row.
pub fn competency_total(entry: &ScoreEntry, competency: &str) -> f64 {
    PROBLEMS.iter().map(|p| entry.score(competency, p)).sum()
}

/// Converts a points total into the 0–5 grade.
pub fn grid_grade(total: f64) -> f64 {
    5.0 * total / MAX_SCORE
}
