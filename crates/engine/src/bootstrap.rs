//! Example-driven output bootstrapping.
//!
//! Given a completed example dataset, regenerate the document's output
//! section by sniffing each tabular file in the dataset: detect the
//! delimiter, read a short sample, and emit one output spec per readable
//! table. Column metadata is filled in from a [`TermDictionary`] when one
//! is provided.

use std::collections::HashMap;

use serde::Deserialize;
use stratus_catalog::CatalogClient;
use stratus_types::{ColumnSpec, OutputCommand, OutputParams, ParseSpec, ReadCsvSpec, COMMAND_PARQUET};
use stratus_util::normalize_column_name;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::output::{Delimiter, SOURCE_PREFIX};
use crate::session::ConfigSession;

/// File extensions considered tabular by default.
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

/// Rows read per file when sniffing its shape.
const SAMPLE_ROWS: usize = 5;

/// Prefix under which a dataset stores its output files.
const DATA_PREFIX: &str = "data/";

/// Reusable column descriptions keyed by normalized column name.
///
/// Parsed from a JSON object mapping normalized names to metadata entries;
/// later entries override earlier ones, and an entry scoped to a concrete
/// file beats one scoped to `"*"`.
#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    terms: HashMap<String, TermEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TermEntry {
    #[serde(default)]
    metadata: Vec<TermMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
struct TermMetadata {
    #[serde(default = "wildcard")]
    file: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    desc: String,
}

fn wildcard() -> String {
    "*".to_string()
}

impl TermDictionary {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let terms: HashMap<String, TermEntry> = serde_json::from_str(text)?;
        Ok(Self { terms })
    }

    /// Column metadata for `column` as it appears in `file`.
    ///
    /// File scopes are compared with any `data/` prefix stripped from both
    /// sides. Falls back to the normalized column name with an empty
    /// description when the dictionary has nothing to say.
    pub fn lookup(&self, column: &str, file: &str) -> ColumnSpec {
        let normalized = normalize_column_name(column);
        let target = file.strip_prefix(DATA_PREFIX).unwrap_or(file);
        let mut fallback: Option<&TermMetadata> = None;
        if let Some(entry) = self.terms.get(&normalized) {
            for metadata in entry.metadata.iter().rev() {
                let scope = metadata.file.strip_prefix(DATA_PREFIX).unwrap_or(&metadata.file);
                if scope == target {
                    return ColumnSpec {
                        col: column.to_string(),
                        name: metadata.name.clone(),
                        desc: metadata.desc.clone(),
                    };
                }
                if metadata.file == "*" && fallback.is_none() {
                    fallback = Some(metadata);
                }
            }
        }
        match fallback {
            Some(metadata) => ColumnSpec {
                col: column.to_string(),
                name: metadata.name.clone(),
                desc: metadata.desc.clone(),
            },
            None => ColumnSpec {
                col: column.to_string(),
                name: normalized,
                desc: String::new(),
            },
        }
    }
}

/// Regenerate the session's output section from an example dataset.
///
/// Every file matching one of `extensions` is sniffed; files that cannot be
/// parsed as a table with more than one column are skipped. The previous
/// output section is replaced wholesale (the replacement is one undoable
/// step). Returns the number of output specs generated.
pub fn bootstrap_outputs(
    session: &mut ConfigSession,
    catalog: &dyn CatalogClient,
    project: &str,
    dataset: &str,
    extensions: &[&str],
    terms: &TermDictionary,
) -> Result<usize> {
    let mut commands = Vec::new();
    for file in catalog.list_files(project, dataset) {
        if !has_extension(&file, extensions) {
            continue;
        }
        if let Some(command) = sniff_output(catalog, project, dataset, &file, terms)? {
            commands.push(command);
        }
    }

    let count = commands.len();
    commands.push(OutputCommand::manifest());

    let mut next = session.document().clone();
    next.output.commands = commands;
    session.replace_document(next)?;
    Ok(count)
}

fn has_extension(file: &str, extensions: &[&str]) -> bool {
    match file.rsplit_once('.') {
        Some((_, extension)) => extensions.iter().any(|e| e.eq_ignore_ascii_case(extension)),
        None => false,
    }
}

/// Read a sample of one dataset file and build its output spec.
///
/// Delimiters are tried in likelihood order (tab first for files whose name
/// mentions "tsv"); the first parse yielding more than one column wins.
fn sniff_output(
    catalog: &dyn CatalogClient,
    project: &str,
    dataset: &str,
    file: &str,
    terms: &TermDictionary,
) -> Result<Option<OutputCommand>> {
    let relative = file.strip_prefix(DATA_PREFIX).ok_or_else(|| {
        ConfigError::Structural(format!(
            "dataset file '{file}' does not live under '{DATA_PREFIX}'"
        ))
    })?;

    let delimiters: [Delimiter; 2] = if file.contains("tsv") {
        [Delimiter::Tab, Delimiter::Comma]
    } else {
        [Delimiter::Comma, Delimiter::Tab]
    };

    for delimiter in delimiters.map(|d| d.as_char()) {
        let sample = match catalog.read_sample(project, dataset, file, delimiter, SAMPLE_ROWS) {
            Ok(sample) => sample,
            Err(error) => {
                debug!(file, %error, "sample read failed");
                continue;
            }
        };
        if sample.columns.len() <= 1 {
            continue;
        }

        let underscored = relative.replace('/', "_");
        let cols = sample
            .columns
            .iter()
            .map(|column| terms.lookup(column, relative))
            .collect();
        return Ok(Some(OutputCommand {
            command: COMMAND_PARQUET.to_string(),
            params: OutputParams {
                name: Some(underscored.clone()),
                desc: Some(underscored.clone()),
                source: Some(format!("{SOURCE_PREFIX}{relative}")),
                url: Some(String::new()),
                target: Some(format!("{underscored}.parquet")),
                cols,
                read_csv: Some(ReadCsvSpec {
                    parse: ParseSpec {
                        delimiter: delimiter.to_string(),
                    },
                }),
            },
            melt: None,
            concat: None,
        }));
    }

    debug!(file, "no delimiter produced a multi-column table; skipping");
    Ok(None)
}
