//! Linear undo/redo history over document snapshots.

use std::collections::VecDeque;

use stratus_types::ConfigDocument;

/// Two stacks of whole-document snapshots.
///
/// The past stack's head is the most recent pre-edit state; the future
/// stack holds states stepped back from. Equality between snapshots is the
/// document's structural equality.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    past: VecDeque<ConfigDocument>,
    future: VecDeque<ConfigDocument>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the pre-edit snapshot of an accepted edit.
    ///
    /// A snapshot equal to the current head is suppressed, and any redo
    /// branch is discarded.
    pub fn record_edit(&mut self, previous: ConfigDocument) {
        if self.past.front() != Some(&previous) {
            self.past.push_front(previous);
        }
        self.future.clear();
    }

    /// Step back: swap `current` with the most recent past snapshot,
    /// stashing the old value on the future stack. Returns `false` (leaving
    /// `current` untouched) when there is nothing to undo.
    pub fn step_back(&mut self, current: &mut ConfigDocument) -> bool {
        match self.past.pop_front() {
            Some(restored) => {
                self.future.push_front(std::mem::replace(current, restored));
                true
            }
            None => false,
        }
    }

    /// Step forward: swap `current` with the nearest future snapshot,
    /// stashing the old value back on the past stack. Returns `false`
    /// (leaving `current` untouched) when there is nothing to redo.
    pub fn step_forward(&mut self, current: &mut ConfigDocument) -> bool {
        match self.future.pop_front() {
            Some(restored) => {
                self.past.push_front(std::mem::replace(current, restored));
                true
            }
            None => false,
        }
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> ConfigDocument {
        let mut document = ConfigDocument::default();
        document.dynamo.name = name.to_string();
        document
    }

    #[test]
    fn record_suppresses_duplicate_head() {
        let mut history = HistoryStack::new();
        history.record_edit(doc("a"));
        history.record_edit(doc("a"));
        assert_eq!(history.past_len(), 1);
        history.record_edit(doc("b"));
        assert_eq!(history.past_len(), 2);
    }

    #[test]
    fn undo_then_redo_restores_both_states() {
        let mut history = HistoryStack::new();
        history.record_edit(doc("v1"));

        let mut current = doc("v2");
        assert!(history.step_back(&mut current));
        assert_eq!(current, doc("v1"));
        assert!(history.can_redo());

        assert!(history.step_forward(&mut current));
        assert_eq!(current, doc("v2"));
        assert_eq!(history.past_len(), 1);
        assert!(!history.can_redo());
    }

    #[test]
    fn new_edit_discards_the_redo_branch() {
        let mut history = HistoryStack::new();
        history.record_edit(doc("v1"));
        let mut current = doc("v2");
        assert!(history.step_back(&mut current));
        assert_eq!(history.future_len(), 1);

        history.record_edit(doc("v1"));
        assert_eq!(history.future_len(), 0);
    }

    #[test]
    fn empty_stacks_leave_current_untouched() {
        let mut history = HistoryStack::new();
        let mut current = doc("current");
        assert!(!history.step_back(&mut current));
        assert!(!history.step_forward(&mut current));
        assert_eq!(current, doc("current"));
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
