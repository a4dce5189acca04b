//! Strongly typed models for the Stratus workflow-configuration document.
//!
//! The [`ConfigDocument`] defined here is the canonical, serializable form of
//! one workflow configuration. It is the single value the editing session,
//! the history stack, and the artifact exporter all agree on. Authoring order
//! matters throughout (parameter maps, schema properties), so ordered maps
//! use `IndexMap` rather than the default sorted map.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod form;
pub mod output;

pub use form::{FormSection, SchemaNode};
pub use output::{
    ColumnSpec, ConcatSpec, MeltAxis, MeltSpec, OutputCommand, OutputParams, OutputSection,
    ParseSpec, ReadCsvSpec, COMMAND_MANIFEST, COMMAND_PARQUET,
};

/// Canonical workflow-configuration document.
///
/// Created empty at session start; every accepted edit produces a new value.
/// Structural equality (`PartialEq`) is the snapshot equality used by the
/// undo/redo history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigDocument {
    /// Workflow identity and repository metadata.
    #[serde(default)]
    pub dynamo: SourceSection,
    /// Form schema presented to the end user when launching the workflow.
    #[serde(default)]
    pub form: FormSection,
    /// Parameter id mapped to its binding expression string.
    #[serde(default)]
    pub input: IndexMap<String, String>,
    /// Ordered tabular output specifications plus the terminal manifest marker.
    #[serde(default)]
    pub output: OutputSection,
    /// Opaque compute configuration text, exported verbatim.
    #[serde(default)]
    pub compute: String,
    /// Opaque preprocess script text, exported verbatim.
    #[serde(default)]
    pub preprocess: String,
}

/// Workflow identity metadata stored under the `dynamo` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSection {
    /// Unique workflow identifier (lowercase alphanumeric with dashes).
    pub id: String,
    /// Short display name.
    pub name: String,
    /// Longer free-text description.
    pub desc: String,
    /// Workflow execution backend.
    pub executor: Executor,
    /// Optional URL documenting the workflow.
    #[serde(rename = "documentationUrl")]
    pub documentation_url: String,
    /// Processes that may consume this workflow's outputs.
    #[serde(rename = "childProcessIds")]
    pub child_process_ids: Vec<String>,
    /// Processes whose outputs may feed this workflow.
    #[serde(rename = "parentProcessIds")]
    pub parent_process_ids: Vec<String>,
    /// Location of the workflow code.
    pub code: CodeSection,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            id: "unique-workflow-id".to_string(),
            name: "My Workflow Name".to_string(),
            desc: "Description of my workflow".to_string(),
            executor: Executor::Nextflow,
            documentation_url: String::new(),
            child_process_ids: Vec::new(),
            parent_process_ids: Vec::new(),
            code: CodeSection::default(),
        }
    }
}

/// Repository coordinates for the workflow code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeSection {
    /// Repository visibility.
    pub repository: RepositoryVisibility,
    /// Entrypoint script within the repository.
    pub script: String,
    /// Repository path formatted as `organization/repository`.
    pub uri: String,
    /// Branch, tag, release, or commit.
    pub version: String,
}

impl Default for CodeSection {
    fn default() -> Self {
        Self {
            repository: RepositoryVisibility::GithubPublic,
            script: "main.nf".to_string(),
            uri: "organization/repository_name".to_string(),
            version: "main".to_string(),
        }
    }
}

/// Workflow execution backend.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Executor {
    #[default]
    Nextflow,
    Cromwell,
}

impl Executor {
    /// Title-case display name used by selection UIs.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Nextflow => "Nextflow",
            Self::Cromwell => "Cromwell",
        }
    }
}

impl FromStr for Executor {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NEXTFLOW" => Ok(Self::Nextflow),
            "CROMWELL" => Ok(Self::Cromwell),
            _ => Err(ParseEnumError("executor")),
        }
    }
}

/// Visibility of the repository hosting the workflow code.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RepositoryVisibility {
    #[default]
    GithubPublic,
    GithubPrivate,
}

impl RepositoryVisibility {
    /// Short display name ("Public" / "Private").
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::GithubPublic => "Public",
            Self::GithubPrivate => "Private",
        }
    }
}

impl FromStr for RepositoryVisibility {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GITHUBPUBLIC" => Ok(Self::GithubPublic),
            "GITHUBPRIVATE" => Ok(Self::GithubPrivate),
            _ => Err(ParseEnumError("repository visibility")),
        }
    }
}

/// Error returned when a document enum string is not recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unrecognized {0} value")]
pub struct ParseEnumError(pub &'static str);

/// One of the six interoperable files a document exports to.
///
/// Every artifact kind has exactly one recognized file name; import of any
/// other name is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Dynamo,
    Form,
    Input,
    Output,
    Compute,
    Preprocess,
}

impl ArtifactKind {
    /// All artifact kinds in export order.
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::Dynamo,
        ArtifactKind::Form,
        ArtifactKind::Input,
        ArtifactKind::Output,
        ArtifactKind::Compute,
        ArtifactKind::Preprocess,
    ];

    /// The exported file name for this artifact.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Dynamo => "process-dynamo.json",
            Self::Form => "process-form.json",
            Self::Input => "process-input.json",
            Self::Output => "process-output.json",
            Self::Compute => "process-compute.config",
            Self::Preprocess => "preprocess.py",
        }
    }

    /// Resolve a file name back to its artifact kind.
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.file_name() == name)
    }

    /// Whether the artifact body is JSON (as opposed to a verbatim text blob).
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Dynamo | Self::Form | Self::Input | Self::Output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_round_trips() {
        let document = ConfigDocument::default();
        let text = serde_json::to_string(&document).expect("serialize document");
        let back: ConfigDocument = serde_json::from_str(&text).expect("deserialize document");
        assert_eq!(back, document);
    }

    #[test]
    fn source_section_serializes_document_keys() {
        let value = serde_json::to_value(SourceSection::default()).expect("serialize source");
        assert_eq!(value["id"], "unique-workflow-id");
        assert_eq!(value["executor"], "NEXTFLOW");
        assert_eq!(value["documentationUrl"], "");
        assert!(value["childProcessIds"].as_array().unwrap().is_empty());
        assert_eq!(value["code"]["repository"], "GITHUBPUBLIC");
        assert_eq!(value["code"]["script"], "main.nf");
    }

    #[test]
    fn executor_parses_case_insensitively() {
        assert_eq!("cromwell".parse::<Executor>().unwrap(), Executor::Cromwell);
        assert_eq!("NEXTFLOW".parse::<Executor>().unwrap(), Executor::Nextflow);
        assert!("spark".parse::<Executor>().is_err());
    }

    #[test]
    fn artifact_names_round_trip() {
        for kind in ArtifactKind::ALL {
            assert_eq!(ArtifactKind::from_file_name(kind.file_name()), Some(kind));
        }
        assert_eq!(ArtifactKind::from_file_name("notes.txt"), None);
    }

    #[test]
    fn input_map_preserves_authoring_order() {
        let mut document = ConfigDocument::default();
        document.input.insert("zeta".into(), String::new());
        document.input.insert("alpha".into(), String::new());
        let keys: Vec<&String> = document.input.keys().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }
}
