//! Tabular output command records.
//!
//! The `output` section of a document is an ordered list of commands. Each
//! `hot.Parquet` entry describes one delimiter-separated output file
//! (path template, column metadata, optional melt/concat transforms); the
//! list is terminated by a single `hot.Manifest` marker.

use serde::{Deserialize, Serialize};

/// Discriminator for a delimiter-separated tabular output.
pub const COMMAND_PARQUET: &str = "hot.Parquet";
/// Discriminator for the terminal manifest marker.
pub const COMMAND_MANIFEST: &str = "hot.Manifest";

/// The `output` section of a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputSection {
    /// Ordered output commands, manifest marker last.
    #[serde(default)]
    pub commands: Vec<OutputCommand>,
}

/// One entry in the output command list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputCommand {
    /// Command discriminator; see [`COMMAND_PARQUET`] and [`COMMAND_MANIFEST`].
    /// Absent or empty discriminators are rejected at load time rather than
    /// during deserialization.
    #[serde(default)]
    pub command: String,
    /// Command parameters.
    #[serde(default)]
    pub params: OutputParams,
    /// Optional melt transform pivoting the remaining columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub melt: Option<MeltSpec>,
    /// Concatenation metadata for path-template tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concat: Option<Vec<ConcatSpec>>,
}

impl OutputCommand {
    /// The terminal manifest marker entry.
    pub fn manifest() -> Self {
        Self {
            command: COMMAND_MANIFEST.to_string(),
            params: OutputParams::default(),
            melt: None,
            concat: None,
        }
    }
}

/// Parameters of a tabular output command.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputParams {
    /// Display name presented to the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Longer description of the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Path template relative to the data-directory prefix; may contain
    /// bracketed tokens such as `[Sample]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Optional documentation URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Derived output path; never independently settable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Column metadata in file order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cols: Vec<ColumnSpec>,
    /// Parse settings for reading the delimited source file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_csv: Option<ReadCsvSpec>,
}

/// Metadata for a single output column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ColumnSpec {
    /// Value in the header row.
    #[serde(default)]
    pub col: String,
    /// Display name for the column's values.
    #[serde(default)]
    pub name: String,
    /// Longer description of the column's values.
    #[serde(default)]
    pub desc: String,
}

/// Melt transform: pivots all columns not listed in `cols` into key/value rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MeltSpec {
    /// Metadata for the pivoted column headers.
    pub key: MeltAxis,
    /// Metadata for the pivoted table values.
    pub value: MeltAxis,
}

/// Name and description of one melt axis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MeltAxis {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
}

/// User-editable metadata for one path-template token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConcatSpec {
    /// Token text as it appears in the path template.
    pub token: String,
    /// Display name for the information the token encodes.
    #[serde(default)]
    pub name: String,
    /// Longer description of the information the token encodes.
    #[serde(default)]
    pub desc: String,
}

/// Parse settings for a delimited source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReadCsvSpec {
    pub parse: ParseSpec,
}

/// Low-level parse options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseSpec {
    /// Field delimiter, a single character.
    pub delimiter: String,
}

impl Default for ParseSpec {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sparse_command_round_trips() {
        let value = json!({
            "command": "hot.Parquet",
            "params": {
                "name": "Counts",
                "source": "$data_directory/counts.csv"
            }
        });
        let command: OutputCommand = serde_json::from_value(value).expect("deserialize command");
        assert_eq!(command.command, COMMAND_PARQUET);
        assert!(command.melt.is_none());
        assert!(command.params.cols.is_empty());

        let back = serde_json::to_value(&command).expect("serialize command");
        assert!(back.get("melt").is_none());
        assert!(back["params"].get("cols").is_none());
    }

    #[test]
    fn manifest_marker_shape() {
        let back = serde_json::to_value(OutputCommand::manifest()).unwrap();
        assert_eq!(back["command"], "hot.Manifest");
        assert_eq!(back["params"], json!({}));
    }
}
