//! Backtracking from a terminal node to the spelling of its bar.

use crate::enumerator::{NoteEnumerator, SpelledNote};
use crate::node::PathNode;

/// Spelled notes of one path, in note order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExtractor {
    notes: Vec<SpelledNote>,
}

impl PathExtractor {
    /// Walk the predecessors of `terminal` back to the initial node.
    pub fn new<C>(terminal: &PathNode<C>) -> Self {
        debug_assert!(!terminal.in_chord(), "terminal inside a chord at {}", terminal.id());
        let mut notes = Vec::new();
        let mut node = terminal;
        loop {
            notes.extend(node.spelled().iter().rev().copied());
            match node.pred() {
                Some(pred) => node = pred.as_ref(),
                None => break,
            }
        }
        notes.reverse();
        Self { notes }
    }

    pub fn notes(&self) -> &[SpelledNote] {
        &self.notes
    }

    /// Commit the spelling, one `rename` per note.
    pub fn rename<E: NoteEnumerator + ?Sized>(&self, target: &mut E) {
        for note in &self.notes {
            target.rename(note.index, note.pitch, note.print);
        }
    }
}
