//! Rule import/export and tabular metrics output.
//!
//! Rules are stored as a JSON array of key-to-state objects. Metrics are
//! written as plain CSV with one row per evaluated population.

use std::ffi::OsString;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::schema::{
    EvolutionConfig, EvolutionHistory, EvolutionResult, Rule, RuleEntries, RuleError,
};

use super::generalisation::GeneralisationReport;

/// Rule file and metrics table errors.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed rule file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Rule {index} is invalid: {source}")]
    Rule {
        index: usize,
        #[source]
        source: RuleError,
    },
}

/// Serialize rules as a pretty JSON array.
pub fn rules_to_json(rules: &[Rule]) -> Result<String, ArchiveError> {
    Ok(serde_json::to_string_pretty(rules)?)
}

/// Parse a JSON array of rule objects, validating each one.
///
/// Repeated keys within an object are rejected, not collapsed.
pub fn rules_from_json(text: &str) -> Result<Vec<Rule>, ArchiveError> {
    let objects: Vec<RuleEntries> = serde_json::from_str(text)?;
    objects
        .into_iter()
        .enumerate()
        .map(|(index, entries)| {
            Rule::try_from(entries).map_err(|source| ArchiveError::Rule { index, source })
        })
        .collect()
}

pub fn save_rules<P: AsRef<Path>>(path: P, rules: &[Rule]) -> Result<(), ArchiveError> {
    fs::write(path, rules_to_json(rules)?)?;
    Ok(())
}

pub fn load_rules<P: AsRef<Path>>(path: P) -> Result<Vec<Rule>, ArchiveError> {
    let text = fs::read_to_string(path)?;
    rules_from_json(&text)
}

/// Render the per-generation scores as CSV.
///
/// Each row carries the generation index, every individual score in
/// population order, the max and mean, then the run settings.
pub fn history_to_csv(history: &EvolutionHistory, config: &EvolutionConfig) -> String {
    let width = history
        .records
        .iter()
        .map(|r| r.scores.len())
        .max()
        .unwrap_or(config.population.size);

    let mut out = String::from("generation");
    for i in 1..=width {
        let _ = write!(out, ",rule_{i}");
    }
    out.push_str(",max,mean,encoding,selection,crossover,mutation_rate,population,selection_size\n");

    let genetic = &config.genetic;
    for record in &history.records {
        let _ = write!(out, "{}", record.generation);
        for score in &record.scores {
            let _ = write!(out, ",{score}");
        }
        let _ = writeln!(
            out,
            ",{},{},{},{},{},{},{},{}",
            record.max_fitness,
            record.mean_fitness,
            config.encoding,
            genetic.selection,
            genetic.crossover,
            genetic.mutation_rate,
            config.population.size,
            genetic.selection_size
        );
    }

    out
}

pub fn write_history_csv<P: AsRef<Path>>(
    path: P,
    history: &EvolutionHistory,
    config: &EvolutionConfig,
) -> Result<(), ArchiveError> {
    fs::write(path, history_to_csv(history, config))?;
    Ok(())
}

/// Render generalisation scores as CSV, one row per rule.
pub fn generalisation_to_csv(report: &GeneralisationReport) -> String {
    let mut out = String::from("rule");
    for i in 1..=report.repetitions {
        let _ = write!(out, ",rep{i}");
    }
    out.push('\n');

    for result in &report.results {
        let _ = write!(out, "{}", result.rule);
        for score in &result.scores {
            let _ = write!(out, ",{score}");
        }
        out.push('\n');
    }

    out
}

pub fn write_generalisation_csv<P: AsRef<Path>>(
    path: P,
    report: &GeneralisationReport,
) -> Result<(), ArchiveError> {
    fs::write(path, generalisation_to_csv(report))?;
    Ok(())
}

/// `prefix` with `suffix` appended to its final component.
fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut path = OsString::from(prefix.as_os_str());
    path.push(suffix);
    PathBuf::from(path)
}

/// Write `<prefix>.json` with the best rules and `<prefix>.csv` with the
/// history. Returns both paths.
pub fn save_run<P: AsRef<Path>>(
    prefix: P,
    result: &EvolutionResult,
    config: &EvolutionConfig,
) -> Result<(PathBuf, PathBuf), ArchiveError> {
    let prefix = prefix.as_ref();
    if let Some(parent) = prefix.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let rules_path = with_suffix(prefix, ".json");
    let csv_path = with_suffix(prefix, ".csv");

    let best: Vec<Rule> = result.best.iter().map(|c| c.rule.clone()).collect();
    save_rules(&rules_path, &best)?;
    write_history_csv(&csv_path, &result.history, config)?;

    Ok((rules_path, csv_path))
}
