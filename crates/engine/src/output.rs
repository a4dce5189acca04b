//! Output-table state.
//!
//! [`OutputState`] is the editable session form of one `hot.Parquet`
//! command: the relative path template, column and melt metadata, and the
//! concat entries derived from bracketed tokens in the template. The module
//! also hosts the overlap filter that removes concrete specs matched by a
//! templated one.

use once_cell::sync::Lazy;
use regex::Regex;
use stratus_types::{
    COMMAND_PARQUET, ColumnSpec, ConcatSpec, MeltAxis, MeltSpec, OutputCommand, OutputParams,
    ParseSpec, ReadCsvSpec,
};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// Prefix of every absolute source path template.
pub const SOURCE_PREFIX: &str = "$data_directory/";

/// Bracketed token in a path template, e.g. `[Sample]`.
static TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([A-Za-z]+)\]").expect("token pattern compiles"));

/// Field delimiter of a tabular source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Tab,
    Comma,
}

impl Delimiter {
    pub const ALL: [Delimiter; 2] = [Delimiter::Tab, Delimiter::Comma];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Tab => "Tab",
            Self::Comma => "Comma",
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Tab => '\t',
            Self::Comma => ',',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '\t' => Some(Self::Tab),
            ',' => Some(Self::Comma),
            _ => None,
        }
    }
}

/// One column of an output table, with a session-local deletion flag.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnState {
    pub spec: ColumnSpec,
    /// Hidden from `dump` output until the next `load`.
    pub deleted: bool,
}

/// Editable melt transform: key/value axis metadata plus an enabled switch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeltState {
    pub enabled: bool,
    pub key_name: String,
    pub key_desc: String,
    pub value_name: String,
    pub value_desc: String,
}

impl MeltState {
    fn load(spec: Option<&MeltSpec>) -> Self {
        match spec {
            Some(melt) => Self {
                enabled: true,
                key_name: melt.key.name.clone(),
                key_desc: melt.key.desc.clone(),
                value_name: melt.value.name.clone(),
                value_desc: melt.value.desc.clone(),
            },
            None => Self::default(),
        }
    }

    fn dump(&self) -> Option<MeltSpec> {
        self.enabled.then(|| MeltSpec {
            key: MeltAxis {
                name: self.key_name.clone(),
                desc: self.key_desc.clone(),
            },
            value: MeltAxis {
                name: self.value_name.clone(),
                desc: self.value_desc.clone(),
            },
        })
    }
}

/// Editable session state for one tabular output command.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputState {
    pub name: String,
    pub desc: String,
    pub url: String,
    /// Path template relative to [`SOURCE_PREFIX`]; may contain tokens.
    source: String,
    pub delimiter: char,
    pub columns: Vec<ColumnState>,
    pub melt: MeltState,
    /// Token metadata, one entry per distinct token in `source`.
    pub concat: Vec<ConcatSpec>,
    /// Hidden from `dump` output until the next `load`.
    pub deleted: bool,
    /// Set when the overlap filter could not converge on a stable spec set.
    pub ambiguous: bool,
}

impl OutputState {
    /// Build editable state from one `hot.Parquet` command.
    pub fn load(command: &OutputCommand) -> Result<Self> {
        if command.command != COMMAND_PARQUET {
            return Err(ConfigError::Structural(format!(
                "expected '{COMMAND_PARQUET}' command, found '{}'",
                command.command
            )));
        }

        let absolute = command.params.source.clone().unwrap_or_default();
        let source = absolute
            .strip_prefix(SOURCE_PREFIX)
            .unwrap_or(absolute.as_str())
            .to_string();

        let delimiter = command
            .params
            .read_csv
            .as_ref()
            .and_then(|read_csv| read_csv.parse.delimiter.chars().next())
            .unwrap_or(',');

        let mut state = Self {
            name: command
                .params
                .name
                .clone()
                .unwrap_or_else(|| "Output File".to_string()),
            desc: command.params.desc.clone().unwrap_or_default(),
            url: command.params.url.clone().unwrap_or_default(),
            source,
            delimiter,
            columns: command
                .params
                .cols
                .iter()
                .map(|spec| ColumnState {
                    spec: spec.clone(),
                    deleted: false,
                })
                .collect(),
            melt: MeltState::load(command.melt.as_ref()),
            concat: Vec::new(),
            deleted: false,
            ambiguous: false,
        };
        state.rebuild_concat(command.concat.as_deref().unwrap_or_default());
        Ok(state)
    }

    /// A fresh empty output spec.
    pub fn new() -> Self {
        Self {
            name: "Output File".to_string(),
            desc: String::new(),
            url: String::new(),
            source: String::new(),
            delimiter: ',',
            columns: Vec::new(),
            melt: MeltState::default(),
            concat: Vec::new(),
            deleted: false,
            ambiguous: false,
        }
    }

    /// The relative path template.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Replace the path template, stripping the absolute prefix and any
    /// surrounding slashes, then re-derive the concat entries.
    pub fn set_source(&mut self, raw: &str) {
        let trimmed = raw.strip_prefix(SOURCE_PREFIX).unwrap_or(raw);
        self.source = trimmed.trim_matches('/').to_string();
        let existing = self.concat.clone();
        self.rebuild_concat(&existing);
    }

    /// Every token occurrence in the path template, in order.
    pub fn tokens(&self) -> Vec<String> {
        TOKEN_REGEX
            .captures_iter(&self.source)
            .map(|capture| capture[1].to_string())
            .collect()
    }

    /// Re-derive concat entries from the current template, preserving
    /// user-entered metadata for tokens that survive (first entry per token
    /// wins, duplicates collapse).
    fn rebuild_concat(&mut self, existing: &[ConcatSpec]) {
        let mut rebuilt: Vec<ConcatSpec> = Vec::new();
        for token in self.tokens() {
            if rebuilt.iter().any(|entry| entry.token == token) {
                continue;
            }
            let entry = existing
                .iter()
                .find(|entry| entry.token == token)
                .cloned()
                .unwrap_or_else(|| ConcatSpec {
                    token: token.clone(),
                    name: token.clone(),
                    desc: token.clone(),
                });
            rebuilt.push(entry);
        }
        self.concat = rebuilt;
    }

    /// Set the delimiter from its display enumeration.
    pub fn set_delimiter(&mut self, delimiter: Delimiter) {
        self.delimiter = delimiter.as_char();
    }

    /// The delimiter's display enumeration, when it is one of the known
    /// choices.
    pub fn delimiter_kind(&self) -> Option<Delimiter> {
        Delimiter::from_char(self.delimiter)
    }

    /// Append a blank column row.
    pub fn add_column(&mut self) {
        self.columns.push(ColumnState {
            spec: ColumnSpec::default(),
            deleted: false,
        });
    }

    /// Whether this spec's template, with each token standing for any text,
    /// matches the other spec's concrete source path.
    pub fn supersedes(&self, other: &OutputState) -> bool {
        match template_regex(&self.source) {
            Some(regex) => regex.is_match(&other.source),
            None => false,
        }
    }

    /// Serialize back into a `hot.Parquet` command. The target path and
    /// parse settings are always recomputed from the template and the
    /// selected delimiter.
    pub fn dump(&self) -> OutputCommand {
        let target = format!("{}.parquet", self.source.replace('/', "_"));
        OutputCommand {
            command: COMMAND_PARQUET.to_string(),
            params: OutputParams {
                name: Some(self.name.clone()),
                desc: Some(self.desc.clone()),
                source: Some(format!("{SOURCE_PREFIX}{}", self.source)),
                url: Some(self.url.clone()),
                target: Some(target),
                cols: self
                    .columns
                    .iter()
                    .filter(|column| !column.deleted)
                    .map(|column| column.spec.clone())
                    .collect(),
                read_csv: Some(ReadCsvSpec {
                    parse: ParseSpec {
                        delimiter: self.delimiter.to_string(),
                    },
                }),
            },
            melt: self.melt.dump(),
            concat: (!self.concat.is_empty()).then(|| self.concat.clone()),
        }
    }
}

impl Default for OutputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile a path template into a matcher: literal segments are matched
/// verbatim and each token matches any text. Returns `None` for templates
/// without tokens.
fn template_regex(template: &str) -> Option<Regex> {
    if !TOKEN_REGEX.is_match(template) {
        return None;
    }
    let mut pattern = String::new();
    let mut cursor = 0;
    for token in TOKEN_REGEX.find_iter(template) {
        pattern.push_str(&regex::escape(&template[cursor..token.start()]));
        pattern.push_str("(.*)");
        cursor = token.end();
    }
    pattern.push_str(&regex::escape(&template[cursor..]));
    Regex::new(&pattern).ok()
}

/// Remove specs whose concrete source is matched by another spec's token
/// template.
///
/// Removal restarts the scan because dropping a spec can expose further
/// matches. The number of passes is bounded by the initial spec count; if
/// the bound is hit the remaining conflicting specs are flagged ambiguous
/// and the filter stops with the set as-is.
pub fn filter_superseded(outputs: &mut Vec<OutputState>) {
    let max_passes = outputs.len();
    let mut passes = 0;
    loop {
        let Some((winner, matched)) = first_conflict(outputs) else {
            return;
        };
        if passes >= max_passes {
            warn!(
                template = %outputs[winner].source(),
                "output overlap filter did not converge; flagging conflicts"
            );
            flag_conflicts(outputs);
            return;
        }
        let mut index = 0;
        outputs.retain(|_| {
            let keep = !matched.contains(&index);
            index += 1;
            keep
        });
        passes += 1;
    }
}

/// First templated spec that matches at least one other spec, with the
/// matched indexes.
fn first_conflict(outputs: &[OutputState]) -> Option<(usize, Vec<usize>)> {
    for (i, candidate) in outputs.iter().enumerate() {
        if candidate.tokens().is_empty() {
            continue;
        }
        let matched: Vec<usize> = outputs
            .iter()
            .enumerate()
            .filter(|(j, other)| *j != i && candidate.supersedes(other))
            .map(|(j, _)| j)
            .collect();
        if !matched.is_empty() {
            return Some((i, matched));
        }
    }
    None
}

fn flag_conflicts(outputs: &mut [OutputState]) {
    let mut involved = vec![false; outputs.len()];
    for (i, candidate) in outputs.iter().enumerate() {
        if candidate.tokens().is_empty() {
            continue;
        }
        for (j, other) in outputs.iter().enumerate() {
            if i != j && candidate.supersedes(other) {
                involved[i] = true;
                involved[j] = true;
            }
        }
    }
    for (output, flagged) in outputs.iter_mut().zip(involved) {
        if flagged {
            output.ambiguous = true;
        }
    }
}
