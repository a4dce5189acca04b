//! Editing session.
//!
//! [`ConfigSession`] owns the committed document, the editable element
//! states, and the undo/redo history, and enforces the commit protocol:
//! element state is mutated freely, then `commit` recomputes the whole
//! document atomically. A failed recompute leaves the previously committed
//! document (and the history) untouched.

use stratus_types::{ConfigDocument, SourceSection};
use tracing::debug;

use crate::elements::{ComputeState, ConfigElements, OutputsState, ParamsState, PreprocessState};
use crate::error::Result;
use crate::history::HistoryStack;

/// One editing session over a configuration document.
#[derive(Debug, Clone, Default)]
pub struct ConfigSession {
    document: ConfigDocument,
    elements: ConfigElements,
    history: HistoryStack,
}

impl ConfigSession {
    /// Start a session over an empty document.
    pub fn new() -> Result<Self> {
        Self::from_document(ConfigDocument::default())
    }

    /// Start a session over an existing document.
    pub fn from_document(mut document: ConfigDocument) -> Result<Self> {
        let mut elements = ConfigElements::default();
        elements.load(&mut document)?;
        Ok(Self {
            document,
            elements,
            history: HistoryStack::new(),
        })
    }

    /// The committed document.
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn source_mut(&mut self) -> &mut SourceSection {
        &mut self.elements.source.source
    }

    pub fn params(&self) -> &ParamsState {
        &self.elements.params
    }

    pub fn params_mut(&mut self) -> &mut ParamsState {
        &mut self.elements.params
    }

    pub fn outputs(&self) -> &OutputsState {
        &self.elements.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut OutputsState {
        &mut self.elements.outputs
    }

    pub fn preprocess_mut(&mut self) -> &mut PreprocessState {
        &mut self.elements.preprocess
    }

    pub fn compute_mut(&mut self) -> &mut ComputeState {
        &mut self.elements.compute
    }

    /// Recompute the document from the element states and install it.
    ///
    /// The recompute starts from a fresh empty document so stale content
    /// can never leak through. On success the pre-edit snapshot is pushed
    /// onto the history (no-op commits push nothing) and every element is
    /// reloaded from the new document. On error nothing changes.
    pub fn commit(&mut self) -> Result<()> {
        let mut next = ConfigDocument::default();
        self.elements.dump(&mut next)?;

        if next != self.document {
            self.history.record_edit(self.document.clone());
        }
        self.document = next;
        self.reload()
    }

    /// Step the document back one snapshot. Returns `Ok(false)` when the
    /// history is empty.
    pub fn undo(&mut self) -> Result<bool> {
        if !self.history.step_back(&mut self.document) {
            debug!("undo requested with empty history");
            return Ok(false);
        }
        self.reload()?;
        Ok(true)
    }

    /// Step the document forward one snapshot. Returns `Ok(false)` when
    /// there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        if !self.history.step_forward(&mut self.document) {
            debug!("redo requested with empty redo branch");
            return Ok(false);
        }
        self.reload()?;
        Ok(true)
    }

    /// Replace the committed document wholesale (artifact import, output
    /// bootstrapping), recording the previous document in the history.
    pub fn replace_document(&mut self, mut document: ConfigDocument) -> Result<()> {
        let mut elements = ConfigElements::default();
        elements.load(&mut document)?;

        if document != self.document {
            self.history.record_edit(self.document.clone());
        }
        self.document = document;
        self.elements = elements;
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        self.elements.load(&mut self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingKind, FormEntryKind};
    use serde_json::json;

    fn document(value: serde_json::Value) -> ConfigDocument {
        serde_json::from_value(value).expect("valid document fixture")
    }

    #[test]
    fn commit_installs_element_edits() {
        let mut session = ConfigSession::new().unwrap();
        session.source_mut().name = "Variant caller".to_string();
        session.commit().unwrap();
        assert_eq!(session.document().dynamo.name, "Variant caller");
        assert_eq!(session.history().past_len(), 1);
    }

    #[test]
    fn noop_commit_records_no_snapshot() {
        let mut session = ConfigSession::new().unwrap();
        session.commit().unwrap();
        assert_eq!(session.history().past_len(), 0);
    }

    #[test]
    fn failed_commit_leaves_the_document_in_place() {
        let mut session = ConfigSession::new().unwrap();
        session.source_mut().name = "Committed".to_string();
        session.commit().unwrap();

        // A reference binding with its selection cleared cannot serialize.
        let id = session.params_mut().add_param();
        let binding = session.params_mut().binding_mut(&id).unwrap();
        binding.set_kind(BindingKind::FormEntry);
        binding.set_form_kind(FormEntryKind::Reference);
        binding.reference_id = None;

        assert!(session.commit().is_err());
        assert_eq!(session.document().dynamo.name, "Committed");
        assert_eq!(session.history().past_len(), 1);
    }

    #[test]
    fn undo_redo_walk_the_edit_chain() {
        let mut session = ConfigSession::new().unwrap();
        session.source_mut().name = "v1".to_string();
        session.commit().unwrap();
        session.source_mut().name = "v2".to_string();
        session.commit().unwrap();

        assert!(session.undo().unwrap());
        assert_eq!(session.document().dynamo.name, "v1");
        assert!(session.redo().unwrap());
        assert_eq!(session.document().dynamo.name, "v2");

        assert!(session.undo().unwrap());
        assert!(session.undo().unwrap());
        assert!(!session.undo().unwrap());
    }

    #[test]
    fn new_edit_after_undo_discards_redo() {
        let mut session = ConfigSession::new().unwrap();
        session.source_mut().name = "v1".to_string();
        session.commit().unwrap();
        assert!(session.undo().unwrap());

        session.source_mut().name = "v1b".to_string();
        session.commit().unwrap();
        assert!(!session.redo().unwrap());
    }

    #[test]
    fn deleted_param_disappears_after_commit() {
        let mut session = ConfigSession::from_document(document(json!({
            "input": { "keep": "a", "drop": "b" }
        })))
        .unwrap();
        session.params_mut().remove_param("drop");
        session.commit().unwrap();
        assert!(session.document().input.contains_key("keep"));
        assert!(!session.document().input.contains_key("drop"));
        assert_eq!(session.params().bindings().len(), 1);
    }

    #[test]
    fn add_param_then_commit_round_trips() {
        let mut session = ConfigSession::new().unwrap();
        let id = session.params_mut().add_param();
        assert_eq!(id, "param_1");
        session
            .params_mut()
            .binding_mut(&id)
            .unwrap()
            .set_kind(BindingKind::FormEntry);
        session.commit().unwrap();

        assert_eq!(
            session.document().input.get("param_1").map(String::as_str),
            Some("$.params.dataset.paramJson.param_1")
        );
        assert!(session.document().form.form.properties.contains_key("param_1"));
    }

    #[test]
    fn replace_document_is_undoable() {
        let mut session = ConfigSession::new().unwrap();
        session.source_mut().name = "before".to_string();
        session.commit().unwrap();

        let mut replacement = session.document().clone();
        replacement.dynamo.name = "after".to_string();
        session.replace_document(replacement).unwrap();
        assert_eq!(session.document().dynamo.name, "after");

        assert!(session.undo().unwrap());
        assert_eq!(session.document().dynamo.name, "before");
    }
}
