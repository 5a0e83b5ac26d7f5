//! CLI entry point for the rubric grader.
//!
//! Provides subcommands for building rubric tables, grading a group of
//! students against a rubric or the beam workshop grid, merging gradebooks
//! and listing saved grades.

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use rubric_grader::{
    config::Settings,
    gradebook::{GradebookSchema, GradebookStore, MergeOptions, merge_files},
    report::{self, Report},
    roster::Roster,
    rubric::{Rubric, RubricBuilder},
    session::{GradingSession, ScoreSheet},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "rubric_grader")]
#[command(about = "Grade student work against weighted rubrics", long_about = None)]
struct Cli {
    /// Gradebook CSV to read and append to (overrides GRADEBOOK_FILE)
    #[arg(long, global = true)]
    gradebook: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a rubric table from a sub-item catalog and item definitions
    BuildRubric {
        /// Comma-separated catalog of sub-items
        #[arg(short, long)]
        sub_items: String,

        /// Item definition: LABEL|SUB,SUB|SOBRE|PESO (sobre and peso are optional)
        #[arg(short = 'i', long = "item", value_name = "ITEM")]
        items: Vec<String>,

        /// Where to write the semicolon-delimited rubric
        #[arg(short, long, default_value = "rubrica_generada.csv")]
        output: PathBuf,
    },
    /// Grade a group against a rubric table, save the grade and write a report
    Grade {
        /// Semicolon-delimited rubric table
        #[arg(short, long)]
        rubric: PathBuf,

        /// JSON score sheet with scores and comments
        #[arg(short, long)]
        sheet: PathBuf,

        /// Student in the group (repeatable)
        #[arg(long = "student", visible_alias = "pick", value_name = "NAME", required = true)]
        students: Vec<String>,

        /// Course roster; every student must appear in its NOMBRE COMPLETO column
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Add a signature line to the report
        #[arg(long, default_value_t = false)]
        sign: bool,

        /// Write the report as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Report path (defaults to REPORT_DIR/calificacion_<names>.txt)
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Grade a group on the fixed beam workshop grid
    GradeGrid {
        /// JSON score sheet keyed by competency and problem
        #[arg(short, long)]
        sheet: PathBuf,

        /// Student in the group (repeatable)
        #[arg(long = "student", visible_alias = "pick", value_name = "NAME", required = true)]
        students: Vec<String>,

        /// Course roster; every student must appear in its NOMBRE COMPLETO column
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Instructor's own grade, stored next to the computed one
        #[arg(long)]
        subjective: Option<f64>,

        /// Add a signature line to the report
        #[arg(long, default_value_t = false)]
        sign: bool,

        /// Write the report as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Report path (defaults to REPORT_DIR/calificacion_<names>.txt)
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Merge two gradebooks on the student column
    Merge {
        /// Gradebook whose grade becomes "Nota Final"
        #[arg(long)]
        first: PathBuf,

        /// Gradebook whose grade becomes "Nota Tarea 1"
        #[arg(long)]
        second: PathBuf,

        /// Consolidated output file
        #[arg(short, long, default_value = "calificaciones_consolidadas_con_comas.csv")]
        output: PathBuf,

        /// Label for the first gradebook's grade column
        #[arg(long, default_value = "Nota Final")]
        first_label: String,

        /// Label for the second gradebook's grade column
        #[arg(long, default_value = "Nota Tarea 1")]
        second_label: String,
    },
    /// List every saved grade
    ShowGradebook,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    let settings = Settings::from_env();

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = settings
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = settings
        .log_file
        .file_name()
        .unwrap_or(OsStr::new("rubric_grader.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let gradebook = cli.gradebook.unwrap_or(settings.gradebook_file.clone());

    match cli.command {
        Commands::BuildRubric {
            sub_items,
            items,
            output,
        } => {
            let exported = build_rubric(&sub_items, &items)?;
            std::fs::write(&output, exported)
                .with_context(|| format!("writing {}", output.display()))?;
            info!(path = %output.display(), items = items.len(), "Rubric written");
        }
        Commands::Grade {
            rubric,
            sheet,
            students,
            roster,
            sign,
            json,
            report,
        } => {
            let rubric = Rubric::from_path(&rubric)
                .with_context(|| format!("loading rubric {}", rubric.display()))?;
            let session = GradingSession::new(rubric);
            grade(
                session,
                &sheet,
                &students,
                roster.as_deref(),
                None,
                sign,
                &gradebook,
                &settings,
                report,
                json,
            )?;
        }
        Commands::GradeGrid {
            sheet,
            students,
            roster,
            subjective,
            sign,
            json,
            report,
        } => {
            let session = GradingSession::grid()?;
            grade(
                session,
                &sheet,
                &students,
                roster.as_deref(),
                subjective,
                sign,
                &gradebook,
                &settings,
                report,
                json,
            )?;
        }
        Commands::Merge {
            first,
            second,
            output,
            first_label,
            second_label,
        } => {
            let options = MergeOptions {
                first_label,
                second_label,
                ..MergeOptions::default()
            };
            let merged = merge_files(&first, &second, &output, &options)?;
            info!(path = %output.display(), rows = merged.len(), "Consolidated gradebook written");
        }
        Commands::ShowGradebook => {
            // A Dual file is read as Dual; Final never forces a migration.
            let store = GradebookStore::new(&gradebook, GradebookSchema::Final);
            let rows = store.load()?;
            if rows.is_empty() {
                info!(path = %gradebook.display(), "Gradebook is empty");
            }
            for row in &rows {
                info!(
                    student = %row.student,
                    grade = %format!("{:.2}", row.grade),
                    subjective = ?row.subjective,
                    date = %row.date,
                    "Grade"
                );
            }
        }
    }

    Ok(())
}

/// Applies a score sheet to `session`, saves the grade and writes the report.
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(skip_all, fields(mode = ?session.mode(), sheet = %sheet.display()))]
fn grade(
    mut session: GradingSession,
    sheet: &Path,
    students: &[String],
    roster: Option<&Path>,
    subjective: Option<f64>,
    sign: bool,
    gradebook: &Path,
    settings: &Settings,
    report_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let roster = roster
        .map(|path| {
            Roster::from_path(path).with_context(|| format!("loading roster {}", path.display()))
        })
        .transpose()?;

    for student in students {
        let name = match &roster {
            Some(roster) => roster.find(student)?,
            None => student.as_str(),
        };
        if !session.add_student(name) {
            warn!(student = %name, "Student listed twice, ignoring");
        }
    }

    ScoreSheet::from_path(sheet)
        .with_context(|| format!("reading score sheet {}", sheet.display()))?
        .apply_to(&mut session)?;
    if subjective.is_some() {
        session.set_subjective_grade(subjective);
    }
    if sign {
        session.set_signature(true);
    }

    let store = GradebookStore::new(gradebook, session.mode().schema());
    let today = Local::now().date_naive();
    let submission = session.submit(&store, today)?;

    info!(
        final_grade = %format!("{:.2}", submission.result.final_grade),
        students = submission.rows.len(),
        gradebook = %gradebook.display(),
        "Grade saved"
    );

    let path = report_path.unwrap_or_else(|| default_report_path(settings, &submission.report, json));
    report::write_report_file(&path, &submission.report, json)?;
    Ok(())
}

fn default_report_path(settings: &Settings, report: &Report, json: bool) -> PathBuf {
    let extension = if json { "json" } else { "txt" };
    settings.report_dir.join(report.file_name(extension))
}

/// Builds a rubric from `LABEL|SUB,SUB|SOBRE|PESO` definitions.
fn build_rubric(sub_items: &str, items: &[String]) -> Result<String> {
    let mut builder = RubricBuilder::new();
    builder.set_sub_items(sub_items);

    for definition in items {
        let mut parts = definition.split('|').map(str::trim);
        let label = parts.next().unwrap_or_default();
        builder.add_item(label)?;

        if let Some(selected) = parts.next() {
            let selected: Vec<&str> = selected
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            builder.select_sub_items(label, &selected)?;
        }
        if let Some(sobre) = parts.next().filter(|s| !s.is_empty()) {
            builder.set_reference_score(label, parse_number(sobre, "sobre")?)?;
        }
        if let Some(peso) = parts.next().filter(|s| !s.is_empty()) {
            builder.set_weight(label, parse_number(peso, "peso")?)?;
        }
        if parts.next().is_some() {
            bail!("item definition '{definition}' has more than four parts");
        }
    }

    Ok(builder.export()?)
}

fn parse_number(value: &str, what: &str) -> Result<f64> {
    value
        .replace(',', ".")
        .parse()
        .with_context(|| format!("{what} '{value}' is not a number"))
}
