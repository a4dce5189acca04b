//! Document elements.
//!
//! Each element owns one section of the configuration document and exposes
//! the same two operations: `load` rebuilds editable state from the
//! document, `dump` serializes the state back into a fresh document. The
//! session runs both over every element in a fixed order.

use stratus_types::{COMMAND_MANIFEST, COMMAND_PARQUET, ConfigDocument, OutputCommand, SourceSection};
use stratus_util::unique_param_id;
use tracing::debug;

use crate::binding::ParamBinding;
use crate::error::{ConfigError, Result};
use crate::output::{self, OutputState};

/// The five document elements, in synchronization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Source,
    Params,
    Outputs,
    Preprocess,
    Compute,
}

impl ElementKind {
    pub const ORDER: [ElementKind; 5] = [
        ElementKind::Source,
        ElementKind::Params,
        ElementKind::Outputs,
        ElementKind::Preprocess,
        ElementKind::Compute,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Source => "Workflow",
            Self::Params => "Parameters",
            Self::Outputs => "Outputs",
            Self::Preprocess => "Preprocess",
            Self::Compute => "Compute",
        }
    }
}

/// Workflow identity element: a direct mirror of the `dynamo` section.
#[derive(Debug, Clone, Default)]
pub struct SourceState {
    pub source: SourceSection,
}

impl SourceState {
    pub fn load(&mut self, document: &ConfigDocument) {
        self.source = document.dynamo.clone();
    }

    pub fn dump(&self, document: &mut ConfigDocument) {
        document.dynamo = self.source.clone();
    }
}

/// Parameter element: the ordered set of bindings behind the `input` map.
#[derive(Debug, Clone, Default)]
pub struct ParamsState {
    params: Vec<ParamBinding>,
}

impl ParamsState {
    /// Rebuild every binding from the document's `input` map, dropping
    /// session-deleted entries for good.
    pub fn load(&mut self, document: &mut ConfigDocument) -> Result<()> {
        let entries: Vec<(String, String)> = document
            .input
            .iter()
            .map(|(id, expression)| (id.clone(), expression.clone()))
            .collect();
        let mut params = Vec::with_capacity(entries.len());
        for (id, expression) in entries {
            params.push(ParamBinding::load(&id, &expression, document)?);
        }
        self.params = params;
        Ok(())
    }

    pub fn dump(&mut self, document: &mut ConfigDocument) -> Result<()> {
        for binding in &mut self.params {
            binding.dump(document)?;
        }
        Ok(())
    }

    /// All bindings, deleted ones included.
    pub fn bindings(&self) -> &[ParamBinding] {
        &self.params
    }

    pub fn binding_mut(&mut self, id: &str) -> Option<&mut ParamBinding> {
        self.params.iter_mut().find(|binding| binding.id == id)
    }

    /// Append a fresh hardcoded binding under the smallest free `param_N`
    /// id and return the id.
    pub fn add_param(&mut self) -> String {
        let id = unique_param_id(self.params.iter().map(|binding| binding.id.as_str()));
        debug!(id = %id, "adding parameter");
        self.params.push(ParamBinding::new_hardcoded(&id));
        id
    }

    /// Flag a binding for deletion; it disappears on the next commit.
    pub fn remove_param(&mut self, id: &str) -> bool {
        match self.binding_mut(id) {
            Some(binding) => {
                binding.deleted = true;
                true
            }
            None => false,
        }
    }
}

/// Output element: the ordered tabular output specs.
#[derive(Debug, Clone, Default)]
pub struct OutputsState {
    outputs: Vec<OutputState>,
}

impl OutputsState {
    /// Rebuild output state from the document's command list.
    ///
    /// The terminal manifest marker is recognized and skipped (it is
    /// re-appended on dump); a missing or unknown discriminator fails the
    /// whole load. Loading also runs the overlap filter, so specs matched
    /// by a templated sibling never reach the session.
    pub fn load(&mut self, document: &ConfigDocument) -> Result<()> {
        let mut outputs = Vec::new();
        for command in &document.output.commands {
            match command.command.as_str() {
                COMMAND_PARQUET => outputs.push(OutputState::load(command)?),
                COMMAND_MANIFEST => {}
                "" => {
                    return Err(ConfigError::Structural(
                        "output entry is missing its 'command' discriminator".to_string(),
                    ));
                }
                other => {
                    return Err(ConfigError::Structural(format!(
                        "unknown output command '{other}'"
                    )));
                }
            }
        }
        output::filter_superseded(&mut outputs);
        self.outputs = outputs;
        Ok(())
    }

    /// Serialize the non-deleted specs, manifest marker last.
    pub fn dump(&self, document: &mut ConfigDocument) {
        let mut commands: Vec<OutputCommand> = self
            .outputs
            .iter()
            .filter(|output| !output.deleted)
            .map(OutputState::dump)
            .collect();
        commands.push(OutputCommand::manifest());
        document.output.commands = commands;
    }

    pub fn outputs(&self) -> &[OutputState] {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut [OutputState] {
        &mut self.outputs
    }

    /// Append a fresh empty output spec. The first spec is named
    /// "Output File", later ones "Output File N".
    pub fn add_output(&mut self) {
        let mut output = OutputState::new();
        if !self.outputs.is_empty() {
            output.name = format!("Output File {}", self.outputs.len() + 1);
        }
        self.outputs.push(output);
    }
}

/// Preprocess element: an opaque Python script carried verbatim.
#[derive(Debug, Clone, Default)]
pub struct PreprocessState {
    pub script: String,
}

impl PreprocessState {
    pub fn load(&mut self, document: &ConfigDocument) {
        self.script = document.preprocess.clone();
    }

    pub fn dump(&self, document: &mut ConfigDocument) {
        document.preprocess = self.script.clone();
    }
}

/// Compute element: an opaque configuration text carried verbatim.
#[derive(Debug, Clone, Default)]
pub struct ComputeState {
    pub config: String,
}

impl ComputeState {
    pub fn load(&mut self, document: &ConfigDocument) {
        self.config = document.compute.clone();
    }

    pub fn dump(&self, document: &mut ConfigDocument) {
        document.compute = self.config.clone();
    }
}

/// All five elements, loaded and dumped in [`ElementKind::ORDER`].
#[derive(Debug, Clone, Default)]
pub struct ConfigElements {
    pub source: SourceState,
    pub params: ParamsState,
    pub outputs: OutputsState,
    pub preprocess: PreprocessState,
    pub compute: ComputeState,
}

impl ConfigElements {
    pub fn load(&mut self, document: &mut ConfigDocument) -> Result<()> {
        for kind in ElementKind::ORDER {
            debug!(element = kind.display_name(), "loading element");
            match kind {
                ElementKind::Source => self.source.load(document),
                ElementKind::Params => self.params.load(document)?,
                ElementKind::Outputs => self.outputs.load(document)?,
                ElementKind::Preprocess => self.preprocess.load(document),
                ElementKind::Compute => self.compute.load(document),
            }
        }
        Ok(())
    }

    pub fn dump(&mut self, document: &mut ConfigDocument) -> Result<()> {
        for kind in ElementKind::ORDER {
            match kind {
                ElementKind::Source => self.source.dump(document),
                ElementKind::Params => self.params.dump(document)?,
                ElementKind::Outputs => self.outputs.dump(document),
                ElementKind::Preprocess => self.preprocess.dump(document),
                ElementKind::Compute => self.compute.dump(document),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> ConfigDocument {
        serde_json::from_value(value).expect("valid document fixture")
    }

    #[test]
    fn load_skips_manifest_and_dump_restores_it() {
        let mut doc = document(json!({
            "output": {
                "commands": [
                    { "command": "hot.Parquet", "params": { "source": "$data_directory/a.csv" } },
                    { "command": "hot.Manifest" }
                ]
            }
        }));
        let mut elements = ConfigElements::default();
        elements.load(&mut doc).unwrap();
        assert_eq!(elements.outputs.outputs().len(), 1);

        let mut out = ConfigDocument::default();
        elements.dump(&mut out).unwrap();
        let commands = &out.output.commands;
        assert_eq!(commands.last().unwrap().command, COMMAND_MANIFEST);
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn unknown_output_command_fails_the_load() {
        let mut doc = document(json!({
            "output": { "commands": [ { "command": "hot.Zip" } ] }
        }));
        let mut elements = ConfigElements::default();
        let error = elements.load(&mut doc).unwrap_err();
        assert!(matches!(error, ConfigError::Structural(_)));
    }

    #[test]
    fn missing_output_command_fails_the_load() {
        let mut doc = document(json!({
            "output": { "commands": [ { "params": {} } ] }
        }));
        let mut elements = ConfigElements::default();
        let error = elements.load(&mut doc).unwrap_err();
        assert!(matches!(error, ConfigError::Structural(_)));
    }

    #[test]
    fn params_load_preserves_document_order() {
        // Deserialize from text: `json!` builds a sorted `Value` map, which
        // would discard the document order this test exercises.
        let mut doc: ConfigDocument = serde_json::from_str(
            r#"{
                "input": {
                    "zeta": "$.params.dataset.name",
                    "alpha": "literal"
                }
            }"#,
        )
        .expect("valid document fixture");
        let mut params = ParamsState::default();
        params.load(&mut doc).unwrap();
        let ids: Vec<&str> = params.bindings().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["zeta", "alpha"]);
    }

    #[test]
    fn add_param_takes_smallest_free_slot() {
        let mut doc = document(json!({
            "input": { "param_1": "a", "param_3": "b" }
        }));
        let mut params = ParamsState::default();
        params.load(&mut doc).unwrap();
        assert_eq!(params.add_param(), "param_2");
        assert_eq!(params.add_param(), "param_4");
    }

    #[test]
    fn removed_param_is_dropped_on_dump() {
        let mut doc = document(json!({
            "input": { "keep": "a", "drop": "b" }
        }));
        let mut params = ParamsState::default();
        params.load(&mut doc).unwrap();
        assert!(params.remove_param("drop"));
        assert!(!params.remove_param("missing"));

        let mut out = ConfigDocument::default();
        params.dump(&mut out).unwrap();
        assert!(out.input.contains_key("keep"));
        assert!(!out.input.contains_key("drop"));
    }

    #[test]
    fn added_outputs_get_numbered_default_names() {
        let mut outputs = OutputsState::default();
        outputs.add_output();
        outputs.add_output();
        assert_eq!(outputs.outputs()[0].name, "Output File");
        assert_eq!(outputs.outputs()[1].name, "Output File 2");
    }

    #[test]
    fn source_round_trips_through_state() {
        let mut doc = ConfigDocument::default();
        let mut state = SourceState::default();
        state.load(&doc);
        state.source.name = "Variant caller".to_string();
        state.dump(&mut doc);
        assert_eq!(doc.dynamo.name, "Variant caller");
    }
}
