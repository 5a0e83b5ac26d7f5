//! Grading report model and its plain-text and JSON renderings.
//!
//! A [`Report`] carries everything a printed grading sheet shows: who was
//! graded, the per-item table with tier colors, feedback comments and the
//! final grade out of 5.0.

use crate::error::Result;
use crate::scoring::grid::{self, ADDITIONAL, ADDITIONAL_CELL, CELL_MAX, COMPETENCIES, PROBLEMS};
use crate::scoring::{GradeResult, ScoreEntry, Tier, TierScale};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info};

pub const RUBRIC_TITLE: &str = "Reporte de Calificación";
pub const GRID_TITLE: &str = "Reporte de Calificación - Taller de Vigas";
const NO_COMMENTS: &str = "No se ingresaron comentarios específicos.";

/// A score together with the tier it is colored with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banded {
    pub value: f64,
    pub tier: Tier,
    pub rgb: (u8, u8, u8),
}

impl Banded {
    pub fn new(value: f64, scale: TierScale) -> Self {
        let tier = scale.tier(value);
        Self {
            value,
            tier,
            rgb: tier.rgb(),
        }
    }
}

/// One rubric item row plus its sub-item rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportItem {
    pub label: String,
    /// Text of the middle column, e.g. `Promedio: 3.50`. The same average is
    /// repeated, colored, in the score column.
    pub summary: String,
    pub average: Banded,
    pub sub_scores: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub name: String,
    pub cells: Vec<Banded>,
    pub total: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditionalRow {
    pub name: String,
    pub score: Banded,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSection {
    pub problems: Vec<String>,
    pub rows: Vec<GridRow>,
    pub additional: Vec<AdditionalRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub students: Vec<String>,
    pub date: NaiveDate,
    pub items: Vec<ReportItem>,
    pub grid: Option<GridSection>,
    /// Non-blank `(item label, comment)` pairs in rubric order.
    pub comments: Vec<(String, String)>,
    pub final_comment: String,
    pub final_grade: f64,
    pub subjective_grade: Option<f64>,
    /// `(points, maximum)` for the fixed grid.
    pub points: Option<(f64, f64)>,
    pub signature: bool,
}

/// Inputs shared by both report layouts.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub students: &'a [String],
    pub date: NaiveDate,
    pub comments: Vec<(String, String)>,
    pub final_comment: &'a str,
    pub subjective_grade: Option<f64>,
    pub signature: bool,
}

impl Report {
    /// Report for a weighted rubric, items banded on the rubric scale.
    pub fn for_rubric(ctx: ReportContext<'_>, result: &GradeResult) -> Self {
        let items = result
            .items
            .iter()
            .map(|item| ReportItem {
                label: item.label.clone(),
                summary: format!("Promedio: {:.2}", item.average),
                average: Banded::new(item.average, TierScale::Rubric),
                sub_scores: item.sub_scores.clone(),
            })
            .collect();

        Self::assemble(RUBRIC_TITLE, ctx, result.final_grade, items, None, None)
    }

    /// Report for the beam workshop grid, cells banded on the grid scale.
    pub fn for_grid(ctx: ReportContext<'_>, result: &GradeResult, entry: &ScoreEntry) -> Self {
        let rows = COMPETENCIES
            .iter()
            .map(|c| GridRow {
                name: grid::short_name(c).to_string(),
                cells: PROBLEMS
                    .iter()
                    .map(|p| Banded::new(entry.score(c, p), TierScale::Grid))
                    .collect(),
                total: grid::competency_total(entry, c),
                max: grid::COMPETENCY_MAX,
            })
            .collect();
        let additional = ADDITIONAL
            .iter()
            .map(|c| AdditionalRow {
                name: grid::short_name(c).to_string(),
                score: Banded::new(entry.score(c, ADDITIONAL_CELL), TierScale::Grid),
                max: CELL_MAX,
            })
            .collect();

        let section = GridSection {
            problems: PROBLEMS.iter().map(|p| p.to_string()).collect(),
            rows,
            additional,
        };
        let points = Some((grid::raw_total(entry), grid::MAX_SCORE));

        Self::assemble(
            GRID_TITLE,
            ctx,
            result.final_grade,
            Vec::new(),
            Some(section),
            points,
        )
    }

    fn assemble(
        title: &str,
        ctx: ReportContext<'_>,
        final_grade: f64,
        items: Vec<ReportItem>,
        grid: Option<GridSection>,
        points: Option<(f64, f64)>,
    ) -> Self {
        Self {
            title: title.to_string(),
            students: ctx.students.to_vec(),
            date: ctx.date,
            items,
            grid,
            comments: ctx
                .comments
                .into_iter()
                .filter(|(_, c)| !c.trim().is_empty())
                .collect(),
            final_comment: ctx.final_comment.to_string(),
            final_grade,
            subjective_grade: ctx.subjective_grade,
            points,
            signature: ctx.signature,
        }
    }

    /// Default file name, e.g. `calificacion_Ana_Sofia.txt`.
    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "calificacion_{}.{extension}",
            self.students.join(", ").replace(' ', "_")
        )
    }
}

fn tagged(score: &Banded) -> String {
    format!("{:.2} [{}]", score.value, score.tier.name())
}

/// Renders the report as a fixed-width text document.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &Report) -> std::fmt::Result {
    writeln!(out, "{}", report.title)?;
    writeln!(out)?;
    writeln!(out, "Estudiante(s): {}", report.students.join(", "))?;
    writeln!(out, "Fecha: {}", report.date.format("%Y-%m-%d"))?;
    writeln!(out)?;

    if !report.items.is_empty() {
        writeln!(out, "{:<40} {:<30} {:>16}", "Item Evaluado", "Sub-item", "Puntaje (0-5)")?;
        for item in &report.items {
            writeln!(
                out,
                "{:<40} {:<30} {:>16}",
                item.label,
                item.summary,
                tagged(&item.average)
            )?;
            for (sub_item, score) in &item.sub_scores {
                writeln!(out, "{:<40} {:<30} {:>16.2}", "", format!("- {sub_item}"), score)?;
            }
        }
        writeln!(out)?;
    }

    if let Some(grid) = &report.grid {
        write!(out, "{:<34}", "Competencia")?;
        for problem in &grid.problems {
            write!(out, " {problem:>10}")?;
        }
        writeln!(out, " {:>8}", "Total")?;
        for row in &grid.rows {
            write!(out, "{:<34}", row.name)?;
            for cell in &row.cells {
                write!(out, " {:>10}", format!("{} [{}]", cell.value, cell.tier.name()))?;
            }
            writeln!(out, " {:>8}", format!("{}/{}", row.total, row.max))?;
        }
        writeln!(out)?;
        writeln!(out, "{:<34} {:>10}", "Componentes Adicionales", "Puntaje")?;
        for row in &grid.additional {
            writeln!(
                out,
                "{:<34} {:>10}",
                row.name,
                format!("{}/{} [{}]", row.score.value, row.max, row.score.tier.name())
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Comentarios de Retroalimentación")?;
    if report.comments.is_empty() {
        writeln!(out, "{NO_COMMENTS}")?;
    }
    for (label, comment) in &report.comments {
        writeln!(out, "- Sobre '{label}':")?;
        writeln!(out, "  \"{comment}\"")?;
    }
    writeln!(out)?;

    writeln!(out, "Comentario Final")?;
    writeln!(out, "{}", report.final_comment)?;
    writeln!(out)?;

    if let Some((points, max)) = report.points {
        writeln!(out, "Puntaje Total: {points} / {max}")?;
    }
    if let Some(subjective) = report.subjective_grade {
        writeln!(out, "Calificación Subjetiva: {subjective:.2} / 5.0")?;
    }
    writeln!(out, "Calificación Final: {:.2} / 5.0", report.final_grade)?;

    if report.signature {
        writeln!(out)?;
        writeln!(out)?;
        writeln!(out, "{}", "_".repeat(35))?;
        writeln!(out, "Firma del Docente")?;
    }
    Ok(())
}

/// Serializes the report as pretty-printed JSON.
pub fn to_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Writes the text rendering (or JSON when `json` is set) to `path`.
pub fn write_report_file(path: impl AsRef<Path>, report: &Report, json: bool) -> Result<()> {
    let path = path.as_ref();
    let body = if json {
        to_json(report)?
    } else {
        render_text(report)
    };
    debug!(path = %path.display(), bytes = body.len(), "Writing report");
    std::fs::write(path, body)?;
    info!(path = %path.display(), "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::{Rubric, RubricItem};
    use crate::scoring::compute_grade;
    use crate::scoring::grid::beam_workshop_rubric;

    fn ctx<'a>(students: &'a [String], comments: Vec<(String, String)>) -> ReportContext<'a> {
        ReportContext {
            students,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            comments,
            final_comment: "Buen trabajo",
            subjective_grade: None,
            signature: false,
        }
    }

    fn rubric_report(signature: bool) -> Report {
        let rubric = Rubric::new(vec![
            RubricItem::new("Punto 1", vec!["DCL".into(), "Fuerzas".into()], 5.0, 2.0),
            RubricItem::new("Punto 2", vec!["Momento".into()], 5.0, 1.0),
        ])
        .unwrap();
        let entry = ScoreEntry::new()
            .with("Punto 1", "DCL", 4.0)
            .with("Punto 1", "Fuerzas", 3.0)
            .with("Punto 2", "Momento", 2.0);
        let result = compute_grade(&rubric, &entry);
        let students = vec!["Ana Sofia".to_string(), "Carlos Perez".to_string()];
        let mut context = ctx(
            &students,
            vec![
                ("Punto 1".into(), "Revisar signos".into()),
                ("Punto 2".into(), "   ".into()),
            ],
        );
        context.signature = signature;
        Report::for_rubric(context, &result)
    }

    #[test]
    fn test_rubric_report_items_and_tiers() {
        let report = rubric_report(false);
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].summary, "Promedio: 3.50");
        assert_eq!(report.items[0].average.tier, Tier::Mid);
        assert_eq!(report.items[1].average.tier, Tier::Low);
        assert_eq!(report.comments, vec![("Punto 1".to_string(), "Revisar signos".to_string())]);
        assert!(report.grid.is_none());
    }

    #[test]
    fn test_render_text_sections() {
        let text = render_text(&rubric_report(true));
        assert!(text.starts_with(RUBRIC_TITLE));
        assert!(text.contains("Estudiante(s): Ana Sofia, Carlos Perez"));
        assert!(text.contains("Fecha: 2024-05-01"));
        assert!(text.contains("Promedio: 3.50"));
        assert!(text.contains("3.50 [medio]"));
        assert!(text.contains("- Sobre 'Punto 1':"));
        assert!(!text.contains("- Sobre 'Punto 2':"));
        assert!(text.contains("Calificación Final: 3.00 / 5.0"));
        assert!(text.contains("Firma del Docente"));
    }

    #[test]
    fn test_no_signature_by_default() {
        assert!(!render_text(&rubric_report(false)).contains("Firma del Docente"));
    }

    #[test]
    fn test_grid_report() {
        let rubric = beam_workshop_rubric().unwrap();
        let mut entry = ScoreEntry::new();
        for c in COMPETENCIES {
            for p in PROBLEMS {
                entry.set(c, p, 3.0);
            }
        }
        let result = compute_grade(&rubric, &entry);
        let students = vec!["Ana".to_string()];
        let report = Report::for_grid(ctx(&students, vec![]), &result, &entry);

        let grid = report.grid.as_ref().unwrap();
        assert_eq!(grid.rows.len(), 7);
        assert_eq!(grid.rows[0].name, "Diagrama de cuerpo libre");
        assert_eq!(grid.rows[0].total, 15.0);
        assert_eq!(grid.rows[0].cells[0].tier, Tier::Mid);
        assert_eq!(grid.additional[0].score.tier, Tier::Low);
        assert_eq!(report.points, Some((105.0, 185.0)));

        let text = render_text(&report);
        assert!(text.contains("Puntaje Total: 105 / 185"));
        assert!(text.contains("Calificación Final: 2.84 / 5.0"));
        assert!(text.contains("15/25"));
        assert!(text.contains(NO_COMMENTS));
    }

    #[test]
    fn test_json_carries_colors() {
        let json = to_json(&rubric_report(false)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["items"][1]["average"]["tier"], "low");
        assert_eq!(value["items"][1]["average"]["rgb"][0], 220);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            rubric_report(false).file_name("txt"),
            "calificacion_Ana_Sofia,_Carlos_Perez.txt"
        );
    }

    #[test]
    fn test_write_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.txt");
        write_report_file(&path, &rubric_report(false), false).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Comentario Final\nBuen trabajo"));
    }

    #[test]
    fn test_write_report_file_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("r.json");
        let err = write_report_file(&path, &rubric_report(false), true).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
