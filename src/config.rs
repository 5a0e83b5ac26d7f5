//! Runtime settings read from the environment (and `.env`).

use std::path::PathBuf;

pub const DEFAULT_GRADEBOOK_FILE: &str = "calificaciones_finales.csv";
pub const DEFAULT_LOG_FILE: &str = "logs/rubric_grader.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Gradebook appended to by grading commands.
    pub gradebook_file: PathBuf,
    /// Directory reports are written to.
    pub report_dir: PathBuf,
    /// JSON log file; rotated daily.
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gradebook_file: PathBuf::from(DEFAULT_GRADEBOOK_FILE),
            report_dir: PathBuf::from("."),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Settings {
    /// Reads `GRADEBOOK_FILE`, `REPORT_DIR` and `LOG_FILE_PATH`, falling back
    /// to the defaults for unset or empty variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str, default: PathBuf| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default)
        };

        Self {
            gradebook_file: get("GRADEBOOK_FILE", defaults.gradebook_file),
            report_dir: get("REPORT_DIR", defaults.report_dir),
            log_file: get("LOG_FILE_PATH", defaults.log_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let env: HashMap<&str, &str> =
            [("GRADEBOOK_FILE", "notas.csv"), ("REPORT_DIR", "  ")].into();
        let settings = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.gradebook_file, PathBuf::from("notas.csv"));
        assert_eq!(settings.report_dir, PathBuf::from("."));
    }
}
