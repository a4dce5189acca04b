//! Parameter bindings.
//!
//! Every entry in the document's `input` map is a binding expression string.
//! [`ParamBinding`] is the typed, editable session representation of one
//! such entry: classification of the expression into one of five kinds,
//! and the exact inverse serialization back into the document.

use indexmap::IndexMap;
use serde_json::Value;
use stratus_catalog::CatalogClient;
use stratus_types::{ConfigDocument, SchemaNode};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Expression bound to the user-chosen dataset name.
pub const EXPR_DATASET_NAME: &str = "$.params.dataset.name";
/// Expression bound to the base URL of the input dataset's files.
pub const EXPR_INPUT_DIRECTORY: &str = "$.params.inputs[0].s3|/data/";
/// Expression bound to the base URL of the output dataset.
pub const EXPR_OUTPUT_DIRECTORY: &str = "$.params.dataset.s3|/data/";
/// Prefix marking an expression that references a form schema node.
pub const FORM_ENTRY_PREFIX: &str = "$.params.dataset.paramJson.";

/// Marker every reference file glob must start with.
const REFERENCE_WILDCARD: &str = "**/";

/// Default process id seeded when a binding switches to dataset selection.
pub const DEFAULT_DATASET_PROCESS: &str = "paired_dnaseq";
/// Default file glob seeded when a binding switches to input-file selection.
pub const DEFAULT_FILE_PATTERN: &str = "**/*";
/// Default reference glob seeded when a binding switches to reference
/// selection.
pub const DEFAULT_REFERENCE_FILE: &str = "**/genome_fasta/**/genome.fasta";

/// How one parameter's value is sourced at launch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// The name of the new dataset, as provided by the user.
    DatasetName,
    /// The base URL of the files making up the input dataset.
    InputDirectory,
    /// The base URL of the dataset created from this workflow's outputs.
    OutputDirectory,
    /// A value collected from the user through the form.
    FormEntry,
    /// A literal value baked into the configuration.
    HardcodedValue,
}

impl BindingKind {
    /// All binding kinds, in the order selection UIs present them.
    pub const ALL: [BindingKind; 5] = [
        BindingKind::DatasetName,
        BindingKind::FormEntry,
        BindingKind::HardcodedValue,
        BindingKind::InputDirectory,
        BindingKind::OutputDirectory,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DatasetName => "Dataset Name",
            Self::FormEntry => "Form Entry",
            Self::HardcodedValue => "Hardcoded Value",
            Self::InputDirectory => "Input Directory",
            Self::OutputDirectory => "Output Directory",
        }
    }

    /// The fixed expression for kinds that have one.
    pub fn fixed_expression(&self) -> Option<&'static str> {
        match self {
            Self::DatasetName => Some(EXPR_DATASET_NAME),
            Self::InputDirectory => Some(EXPR_INPUT_DIRECTORY),
            Self::OutputDirectory => Some(EXPR_OUTPUT_DIRECTORY),
            Self::FormEntry | Self::HardcodedValue => None,
        }
    }

    fn from_fixed_expression(expression: &str) -> Option<Self> {
        match expression {
            EXPR_DATASET_NAME => Some(Self::DatasetName),
            EXPR_INPUT_DIRECTORY => Some(Self::InputDirectory),
            EXPR_OUTPUT_DIRECTORY => Some(Self::OutputDirectory),
            _ => None,
        }
    }
}

/// Sub-kind of a form-entry binding, resolved from the schema node shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEntryKind {
    /// The user selects an existing dataset of a given process type.
    Dataset,
    /// The user selects one or more files from the input dataset.
    InputFile,
    /// The user selects a reference object uploaded to their project.
    Reference,
    /// The user types a plain value constrained by a primitive type.
    UserValue,
}

impl FormEntryKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Dataset => "Catalog Dataset",
            Self::InputFile => "Input File",
            Self::Reference => "Catalog Reference",
            Self::UserValue => "User-Provided Value",
        }
    }
}

/// Primitive value types selectable for a user-provided form entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Array,
    Boolean,
    Integer,
    Number,
    String,
}

impl ValueType {
    pub const ALL: [ValueType; 5] = [
        ValueType::Array,
        ValueType::Boolean,
        ValueType::Integer,
        ValueType::Number,
        ValueType::String,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
        }
    }

    /// The zero value a `default` resets to when the type changes.
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Array => Value::Array(Vec::new()),
            Self::Boolean => Value::Bool(false),
            Self::Integer => Value::from(0),
            Self::Number => Value::from(0.0),
            Self::String => Value::String(String::new()),
        }
    }
}

/// Typed session state for one `input` entry.
#[derive(Debug, Clone)]
pub struct ParamBinding {
    /// Parameter id, unique within the document.
    pub id: String,
    /// The raw binding expression (kept verbatim for hardcoded values).
    pub value: String,
    /// Classified binding kind.
    pub kind: BindingKind,
    /// Hidden from `dump` output until the next `load`.
    pub deleted: bool,
    /// Form schema path, one segment per nesting level (form entries only).
    form_key: Vec<String>,
    /// Schema fragments for the node and each ancestor, keyed by the
    /// dot-joined path prefix.
    form_elements: IndexMap<String, SchemaNode>,
    /// Resolved sub-kind (form entries only).
    pub form_kind: Option<FormEntryKind>,
    /// Reference directory id (reference entries only).
    pub reference_id: Option<String>,
    /// Reference file name (reference entries only).
    pub reference_file: Option<String>,
}

impl ParamBinding {
    /// Classify a binding expression against the document.
    ///
    /// Classification is total and order-sensitive: fixed expressions win,
    /// then the form-entry prefix, then everything else is a hardcoded
    /// value. Form-entry classification walks the document's form tree,
    /// synthesizing any missing ancestor nodes on demand.
    pub fn load(id: &str, expression: &str, document: &mut ConfigDocument) -> Result<Self> {
        let mut binding = Self {
            id: id.to_string(),
            value: expression.to_string(),
            kind: BindingKind::HardcodedValue,
            deleted: false,
            form_key: Vec::new(),
            form_elements: IndexMap::new(),
            form_kind: None,
            reference_id: None,
            reference_file: None,
        };

        if let Some(kind) = BindingKind::from_fixed_expression(expression) {
            binding.kind = kind;
            return Ok(binding);
        }

        if let Some(remainder) = expression.strip_prefix(FORM_ENTRY_PREFIX) {
            binding.kind = BindingKind::FormEntry;
            binding.form_key = remainder.split('.').map(str::to_string).collect();

            for depth in 1..=binding.form_key.len() {
                let prefix = binding.form_key[..depth].join(".");
                let node = document.form.form.ensure_node(&binding.form_key[..depth]);
                binding.form_elements.insert(prefix, node.fragment());
            }

            binding.resolve_form_kind()?;
            return Ok(binding);
        }

        Ok(binding)
    }

    /// A fresh binding for a newly added parameter (empty hardcoded value).
    pub fn new_hardcoded(id: &str) -> Self {
        Self {
            id: id.to_string(),
            value: String::new(),
            kind: BindingKind::HardcodedValue,
            deleted: false,
            form_key: Vec::new(),
            form_elements: IndexMap::new(),
            form_kind: None,
            reference_id: None,
            reference_file: None,
        }
    }

    fn resolve_form_kind(&mut self) -> Result<()> {
        let terminal = self
            .form_config()
            .ok_or_else(|| ConfigError::Structural(format!("missing form node for '{}'", self.id)))?;

        match terminal.path_type.as_deref() {
            Some("dataset") => {
                if terminal.process.is_some() {
                    self.form_kind = Some(FormEntryKind::Dataset);
                } else if terminal.file.is_some() {
                    self.form_kind = Some(FormEntryKind::InputFile);
                } else {
                    return Err(ConfigError::Structural(format!(
                        "expected 'process' or 'file' in form entry '{}'",
                        self.id
                    )));
                }
            }
            Some("references") => {
                let file = terminal.file.clone().ok_or_else(|| {
                    ConfigError::Structural(format!(
                        "expected 'file' for pathType 'references' in '{}'",
                        self.id
                    ))
                })?;
                let trimmed = file.strip_prefix(REFERENCE_WILDCARD).ok_or_else(|| {
                    ConfigError::Structural(format!(
                        "reference 'file' must start with '{REFERENCE_WILDCARD}' in '{}'",
                        self.id
                    ))
                })?;
                self.form_kind = Some(FormEntryKind::Reference);
                self.reference_id = trimmed.split('/').next().map(str::to_string);
                self.reference_file = file.rsplit('/').next().map(str::to_string);
            }
            _ => {
                self.form_kind = Some(FormEntryKind::UserValue);
            }
        }
        Ok(())
    }

    /// The expression this binding serializes to.
    pub fn expression(&self) -> String {
        match self.kind {
            BindingKind::FormEntry => format!("{FORM_ENTRY_PREFIX}{}", self.form_key.join(".")),
            BindingKind::HardcodedValue => self.value.clone(),
            fixed => fixed
                .fixed_expression()
                .expect("fixed binding kinds carry an expression")
                .to_string(),
        }
    }

    /// Terminal schema fragment for a form entry.
    pub fn form_config(&self) -> Option<&SchemaNode> {
        self.form_elements.get(&self.form_key.join("."))
    }

    /// Mutable terminal schema fragment for a form entry.
    pub fn form_config_mut(&mut self) -> Option<&mut SchemaNode> {
        self.form_elements.get_mut(&self.form_key.join("."))
    }

    /// Serialize this binding into the document.
    ///
    /// Form entries write their schema fragment and every ancestor fragment
    /// into the form tree (existing nodes are never overwritten), then write
    /// the prefixed path expression into `input`. Fixed kinds write their
    /// fixed expression; hardcoded values pass through verbatim. Deleted
    /// bindings write nothing.
    pub fn dump(&mut self, document: &mut ConfigDocument) -> Result<()> {
        if self.deleted {
            return Ok(());
        }

        if self.kind == BindingKind::FormEntry {
            if self.form_kind == Some(FormEntryKind::Reference) {
                let reference_id = self.reference_id.clone().ok_or_else(|| {
                    ConfigError::Structural(format!("reference binding '{}' has no reference id", self.id))
                })?;
                let reference_file = self.reference_file.clone().ok_or_else(|| {
                    ConfigError::Structural(format!("reference binding '{}' has no file name", self.id))
                })?;
                let file = format!("**/{reference_id}/**/{reference_file}");
                if let Some(terminal) = self.form_config_mut() {
                    terminal.file = Some(file);
                }
            }

            // New bindings that never went through load live at the root.
            if self.form_key.is_empty() {
                self.form_key = vec![self.id.clone()];
            }
            if self.form_elements.is_empty() {
                self.form_elements.insert(self.id.clone(), SchemaNode::default());
            }

            for depth in 1..=self.form_key.len() {
                let prefix = self.form_key[..depth].join(".");
                let fragment = self.form_elements.get(&prefix).cloned().ok_or_else(|| {
                    ConfigError::Structural(format!(
                        "form entry '{}' is missing the fragment for '{prefix}'",
                        self.id
                    ))
                })?;
                document.form.form.merge_missing(&self.form_key[..depth], fragment);
            }
        }

        document.input.insert(self.id.clone(), self.expression());
        Ok(())
    }

    /// Switch the binding kind, resetting state the new kind cannot carry.
    pub fn set_kind(&mut self, kind: BindingKind) {
        self.kind = kind;
        match kind {
            BindingKind::FormEntry => {
                self.value = format!("{FORM_ENTRY_PREFIX}{}", self.id);
                self.form_kind = Some(FormEntryKind::UserValue);
                self.form_key = vec![self.id.clone()];
                let mut node = SchemaNode::string_leaf(&self.id);
                node.default = Some(Value::String(String::new()));
                node.description = Some(format!("Description of {}", self.id));
                self.form_elements = IndexMap::from([(self.id.clone(), node)]);
            }
            BindingKind::HardcodedValue => {
                self.value = String::new();
            }
            fixed => {
                self.value = fixed
                    .fixed_expression()
                    .expect("fixed binding kinds carry an expression")
                    .to_string();
            }
        }
    }

    /// Switch the form-entry sub-kind, resetting conflicting node fields.
    pub fn set_form_kind(&mut self, kind: FormEntryKind) {
        self.form_kind = Some(kind);
        match kind {
            FormEntryKind::UserValue => {
                if let Some(node) = self.form_config_mut() {
                    node.node_type = Some("string".to_string());
                    node.file = None;
                    node.path_type = None;
                    node.process = None;
                }
            }
            FormEntryKind::Dataset => {
                if let Some(node) = self.form_config_mut() {
                    node.node_type = Some("string".to_string());
                    node.path_type = Some("dataset".to_string());
                    node.process = Some(DEFAULT_DATASET_PROCESS.to_string());
                    node.file = None;
                }
            }
            FormEntryKind::InputFile => {
                if let Some(node) = self.form_config_mut() {
                    node.node_type = Some("string".to_string());
                    node.path_type = Some("dataset".to_string());
                    node.file = Some(DEFAULT_FILE_PATTERN.to_string());
                    node.process = None;
                }
            }
            FormEntryKind::Reference => {
                if let Some(node) = self.form_config_mut() {
                    node.node_type = Some("string".to_string());
                    node.path_type = Some("references".to_string());
                    node.file = Some(DEFAULT_REFERENCE_FILE.to_string());
                }
                let trimmed = DEFAULT_REFERENCE_FILE
                    .strip_prefix(REFERENCE_WILDCARD)
                    .unwrap_or(DEFAULT_REFERENCE_FILE);
                self.reference_id = trimmed.split('/').next().map(str::to_string);
                self.reference_file = DEFAULT_REFERENCE_FILE.rsplit('/').next().map(str::to_string);
            }
        }
    }

    /// Change the primitive value type of a user-provided entry, resetting
    /// `default` to the type's zero value.
    pub fn set_value_type(&mut self, value_type: ValueType) {
        if let Some(node) = self.form_config_mut() {
            node.node_type = Some(value_type.as_str().to_string());
            node.default = Some(value_type.zero_value());
        }
    }

    /// Point a reference binding at a catalog reference chosen by display
    /// name, keeping the currently selected file when it remains valid.
    pub fn select_reference(&mut self, catalog: &dyn CatalogClient, name: &str) -> Result<()> {
        let reference = catalog
            .list_reference_types()
            .into_iter()
            .find(|reference| reference.name == name)
            .ok_or_else(|| ConfigError::Lookup(format!("could not find reference: {name}")))?;

        debug!(name, directory = %reference.directory, "selected reference type");
        self.reference_id = Some(reference.directory.clone());
        let current = self.reference_file.as_deref().unwrap_or_default();
        if !reference.filenames.iter().any(|file| file == current) {
            self.reference_file = Some(
                reference
                    .filenames
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "*".to_string()),
            );
        }
        Ok(())
    }

    /// Constrain a dataset binding to a process chosen by display name.
    pub fn select_process(&mut self, catalog: &dyn CatalogClient, display: &str) -> Result<()> {
        let id = stratus_catalog::ProcessInfo::id_from_display(display);
        let known = catalog
            .list_processes(true)
            .into_iter()
            .any(|process| process.id == id);
        if !known {
            return Err(ConfigError::Lookup(format!(
                "could not find process for '{display}'"
            )));
        }
        if let Some(node) = self.form_config_mut() {
            node.process = Some(id.to_string());
        }
        Ok(())
    }

    /// Form schema path for a form entry (empty otherwise).
    pub fn form_key(&self) -> &[String] {
        &self.form_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stratus_catalog::{InMemoryCatalog, ReferenceType};

    fn document(value: serde_json::Value) -> ConfigDocument {
        serde_json::from_value(value).expect("valid document fixture")
    }

    #[test]
    fn fixed_expressions_classify_to_their_kinds() {
        let mut doc = ConfigDocument::default();
        let cases = [
            (EXPR_DATASET_NAME, BindingKind::DatasetName),
            (EXPR_INPUT_DIRECTORY, BindingKind::InputDirectory),
            (EXPR_OUTPUT_DIRECTORY, BindingKind::OutputDirectory),
        ];
        for (expression, expected) in cases {
            let binding = ParamBinding::load("p", expression, &mut doc).unwrap();
            assert_eq!(binding.kind, expected);
            assert_eq!(binding.expression(), expression);
        }
    }

    #[test]
    fn unrecognized_expression_is_hardcoded() {
        let mut doc = ConfigDocument::default();
        let binding = ParamBinding::load("flag", "--deep", &mut doc).unwrap();
        assert_eq!(binding.kind, BindingKind::HardcodedValue);
        assert_eq!(binding.expression(), "--deep");
    }

    #[test]
    fn form_entry_synthesizes_missing_nodes() {
        let mut doc = ConfigDocument::default();
        let binding = ParamBinding::load(
            "threshold",
            "$.params.dataset.paramJson.advanced.threshold",
            &mut doc,
        )
        .unwrap();
        assert_eq!(binding.kind, BindingKind::FormEntry);
        assert_eq!(binding.form_kind, Some(FormEntryKind::UserValue));
        assert_eq!(binding.form_key(), ["advanced", "threshold"]);

        let advanced = doc.form.form.properties.get("advanced").unwrap();
        assert_eq!(advanced.node_type.as_deref(), Some("object"));
        assert!(advanced.properties.contains_key("threshold"));
    }

    #[test]
    fn dataset_node_resolves_by_discriminator() {
        let mut doc = document(json!({
            "form": {
                "form": {
                    "properties": {
                        "genome": {
                            "type": "string",
                            "pathType": "dataset",
                            "process": "paired_dnaseq"
                        }
                    }
                }
            }
        }));
        let binding =
            ParamBinding::load("genome", "$.params.dataset.paramJson.genome", &mut doc).unwrap();
        assert_eq!(binding.form_kind, Some(FormEntryKind::Dataset));
    }

    #[test]
    fn dataset_without_process_or_file_is_structural() {
        let mut doc = document(json!({
            "form": {
                "form": {
                    "properties": {
                        "broken": { "type": "string", "pathType": "dataset" }
                    }
                }
            }
        }));
        let error =
            ParamBinding::load("broken", "$.params.dataset.paramJson.broken", &mut doc).unwrap_err();
        assert!(matches!(error, ConfigError::Structural(_)));
    }

    #[test]
    fn reference_node_parses_directory_and_file() {
        let mut doc = document(json!({
            "form": {
                "form": {
                    "properties": {
                        "genome": {
                            "type": "string",
                            "pathType": "references",
                            "file": "**/genome_fasta/**/genome.fasta"
                        }
                    }
                }
            }
        }));
        let binding =
            ParamBinding::load("genome", "$.params.dataset.paramJson.genome", &mut doc).unwrap();
        assert_eq!(binding.form_kind, Some(FormEntryKind::Reference));
        assert_eq!(binding.reference_id.as_deref(), Some("genome_fasta"));
        assert_eq!(binding.reference_file.as_deref(), Some("genome.fasta"));
    }

    #[test]
    fn reference_without_wildcard_prefix_is_structural() {
        let mut doc = document(json!({
            "form": {
                "form": {
                    "properties": {
                        "genome": {
                            "type": "string",
                            "pathType": "references",
                            "file": "genome_fasta/genome.fasta"
                        }
                    }
                }
            }
        }));
        let error =
            ParamBinding::load("genome", "$.params.dataset.paramJson.genome", &mut doc).unwrap_err();
        assert!(matches!(error, ConfigError::Structural(_)));
    }

    #[test]
    fn dump_round_trips_classification() {
        let mut doc = ConfigDocument::default();
        let mut binding = ParamBinding::load(
            "threshold",
            "$.params.dataset.paramJson.group.threshold",
            &mut doc,
        )
        .unwrap();

        let mut out = ConfigDocument::default();
        binding.dump(&mut out).unwrap();
        assert_eq!(
            out.input.get("threshold").map(String::as_str),
            Some("$.params.dataset.paramJson.group.threshold")
        );
        let expression = out.input.get("threshold").unwrap().clone();
        let mut reloaded = out.clone();
        let reparsed = ParamBinding::load("threshold", &expression, &mut reloaded).unwrap();
        assert_eq!(reparsed.form_key(), binding.form_key());
    }

    #[test]
    fn dump_skips_deleted_bindings() {
        let mut binding = ParamBinding::new_hardcoded("gone");
        binding.deleted = true;
        let mut out = ConfigDocument::default();
        binding.dump(&mut out).unwrap();
        assert!(out.input.is_empty());
    }

    #[test]
    fn dump_never_overwrites_existing_form_nodes() {
        let mut doc = document(json!({
            "form": {
                "form": {
                    "properties": {
                        "threshold": { "type": "integer", "title": "Depth threshold", "default": 10 }
                    }
                }
            }
        }));
        let mut binding =
            ParamBinding::load("threshold", "$.params.dataset.paramJson.threshold", &mut doc)
                .unwrap();

        // Simulate a stale fragment competing with newer document content.
        let mut out = doc.clone();
        if let Some(node) = binding.form_config_mut() {
            node.title = Some("stale".into());
        }
        binding.dump(&mut out).unwrap();
        assert_eq!(
            out.form.form.properties.get("threshold").unwrap().title.as_deref(),
            Some("Depth threshold")
        );
    }

    #[test]
    fn switching_to_form_entry_seeds_a_user_value_leaf() {
        let mut binding = ParamBinding::new_hardcoded("depth");
        binding.set_kind(BindingKind::FormEntry);
        assert_eq!(binding.form_kind, Some(FormEntryKind::UserValue));
        let node = binding.form_config().unwrap();
        assert_eq!(node.node_type.as_deref(), Some("string"));
        assert_eq!(node.title.as_deref(), Some("depth"));
        assert_eq!(node.default, Some(serde_json::Value::String(String::new())));
        assert_eq!(node.description.as_deref(), Some("Description of depth"));
    }

    #[test]
    fn switching_sub_kind_resets_conflicting_fields() {
        let mut binding = ParamBinding::new_hardcoded("sample");
        binding.set_kind(BindingKind::FormEntry);

        binding.set_form_kind(FormEntryKind::Dataset);
        let node = binding.form_config().unwrap();
        assert_eq!(node.path_type.as_deref(), Some("dataset"));
        assert_eq!(node.process.as_deref(), Some(DEFAULT_DATASET_PROCESS));
        assert!(node.file.is_none());

        binding.set_form_kind(FormEntryKind::InputFile);
        let node = binding.form_config().unwrap();
        assert_eq!(node.file.as_deref(), Some(DEFAULT_FILE_PATTERN));
        assert!(node.process.is_none());

        binding.set_form_kind(FormEntryKind::UserValue);
        let node = binding.form_config().unwrap();
        assert!(node.path_type.is_none());
        assert!(node.file.is_none());
    }

    #[test]
    fn value_type_change_resets_default_to_zero() {
        let mut binding = ParamBinding::new_hardcoded("count");
        binding.set_kind(BindingKind::FormEntry);
        binding.set_value_type(ValueType::Integer);
        let node = binding.form_config().unwrap();
        assert_eq!(node.node_type.as_deref(), Some("integer"));
        assert_eq!(node.default, Some(serde_json::json!(0)));
    }

    #[test]
    fn reference_dump_rebuilds_the_glob() {
        let mut binding = ParamBinding::new_hardcoded("genome");
        binding.set_kind(BindingKind::FormEntry);
        binding.set_form_kind(FormEntryKind::Reference);
        binding.reference_id = Some("star_index".into());
        binding.reference_file = Some("index.tar.gz".into());

        let mut out = ConfigDocument::default();
        binding.dump(&mut out).unwrap();
        let node = out.form.form.properties.get("genome").unwrap();
        assert_eq!(node.file.as_deref(), Some("**/star_index/**/index.tar.gz"));
    }

    #[test]
    fn unknown_reference_selection_is_a_lookup_error() {
        let catalog = InMemoryCatalog::new().with_references(vec![ReferenceType {
            name: "Genome FASTA".into(),
            directory: "genome_fasta".into(),
            filenames: vec!["genome.fasta".into()],
        }]);
        let mut binding = ParamBinding::new_hardcoded("genome");
        binding.set_kind(BindingKind::FormEntry);
        binding.set_form_kind(FormEntryKind::Reference);

        binding.select_reference(&catalog, "Genome FASTA").unwrap();
        assert_eq!(binding.reference_id.as_deref(), Some("genome_fasta"));

        let error = binding.select_reference(&catalog, "Unknown").unwrap_err();
        assert!(matches!(error, ConfigError::Lookup(_)));
    }
}
