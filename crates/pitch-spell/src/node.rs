//! Nodes of the spelling search graph.
//!
//! A node stands for a spelling of every note before `id` in one bar. It owns
//! its accidental state and cost; the predecessor is shared, so many
//! candidate successors can hang off one ancestor.

use std::rc::Rc;

use crate::cost::Cost;
use crate::enumerator::SpelledNote;
use crate::pitch::{Accidental, NoteName};
use crate::state::AccidentalState;

/// A chord being spelled, one pitch at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordProgress {
    /// Note indices of the chord, in processing order.
    pub order: Vec<usize>,
    /// Letter, accidental and print flag already chosen per pitch class.
    pub chosen: [Option<(NoteName, Accidental, bool)>; 12],
    /// Spellings made so far, in processing order.
    pub notes: Vec<SpelledNote>,
}

impl ChordProgress {
    pub fn new(order: Vec<usize>) -> Self {
        Self {
            order,
            chosen: [None; 12],
            notes: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.notes.len() == self.order.len()
    }

    /// Next note index to spell.
    pub fn next(&self) -> Option<usize> {
        self.order.get(self.notes.len()).copied()
    }

    /// No other pitch class of the chord uses `name` with a different accidental.
    pub fn consistent(&self, name: NoteName, accidental: Accidental) -> bool {
        self.chosen
            .iter()
            .flatten()
            .all(|(n, a, _)| *n != name || *a == accidental)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Start of a bar, nothing spelled.
    Initial,
    Single(SpelledNote),
    /// Inside a chord. Never a terminal.
    ChordPartial(ChordProgress),
    /// A whole chord, notes sorted by index.
    ChordDone(Vec<SpelledNote>),
}

#[derive(Debug)]
pub struct PathNode<C> {
    id: usize,
    state: AccidentalState,
    cost: C,
    pred: Option<Rc<PathNode<C>>>,
    kind: NodeKind,
}

impl<C: Cost> PathNode<C> {
    /// Start node at note `id`, with a zero cost derived from `seed`.
    pub fn initial(id: usize, state: AccidentalState, seed: &C) -> Self {
        Self {
            id,
            state,
            cost: seed.zero(),
            pred: None,
            kind: NodeKind::Initial,
        }
    }

    pub(crate) fn successor(
        id: usize,
        state: AccidentalState,
        cost: C,
        pred: Rc<PathNode<C>>,
        kind: NodeKind,
    ) -> Self {
        debug_assert!(id > pred.id, "node id must increase: {} after {}", id, pred.id);
        debug_assert!(!cost.less(&pred.cost), "cost decreased: {} after {}", cost, pred.cost);
        Self {
            id,
            state,
            cost,
            pred: Some(pred),
            kind,
        }
    }
}

impl<C> PathNode<C> {
    /// Index of the next note to read.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> &AccidentalState {
        &self.state
    }

    pub fn cost(&self) -> &C {
        &self.cost
    }

    pub fn pred(&self) -> Option<&Rc<PathNode<C>>> {
        self.pred.as_ref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_initial(&self) -> bool {
        matches!(self.kind, NodeKind::Initial)
    }

    pub fn in_chord(&self) -> bool {
        matches!(self.kind, NodeKind::ChordPartial(_))
    }

    /// Notes spelled by the step into this node.
    pub fn spelled(&self) -> &[SpelledNote] {
        match &self.kind {
            NodeKind::Initial | NodeKind::ChordPartial(_) => &[],
            NodeKind::Single(note) => std::slice::from_ref(note),
            NodeKind::ChordDone(notes) => notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::AccidCost;
    use crate::pitch::Pitch;
    use crate::state::StateScope;
    use crate::tonality::Tonality;

    fn note(index: usize, midi: u8, name: NoteName, accidental: Accidental) -> SpelledNote {
        SpelledNote {
            index,
            midi,
            pitch: Pitch::spell(midi, name, accidental),
            print: false,
        }
    }

    #[test]
    fn test_chord_consistency() {
        let mut progress = ChordProgress::new(vec![0, 1, 2]);
        progress.chosen[1] = Some((NoteName::C, Accidental::Sharp, true));
        assert!(progress.consistent(NoteName::C, Accidental::Sharp));
        assert!(!progress.consistent(NoteName::C, Accidental::Natural));
        assert!(progress.consistent(NoteName::D, Accidental::Flat));
        assert_eq!(progress.next(), Some(0));
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_spelled_notes_by_kind() {
        let c = Tonality::major(0).unwrap();
        let state = AccidentalState::from_tonality(&c, true, StateScope::Letter);
        let root = Rc::new(PathNode::initial(0, state.clone(), &AccidCost::new(false)));
        assert!(root.is_initial());
        assert!(root.spelled().is_empty());

        let single = PathNode::successor(
            1,
            state.clone(),
            AccidCost::new(false),
            root.clone(),
            NodeKind::Single(note(0, 60, NoteName::C, Accidental::Natural)),
        );
        assert_eq!(single.spelled().len(), 1);
        assert_eq!(single.pred().map(|p| p.id()), Some(0));

        let chord = PathNode::successor(
            3,
            state,
            AccidCost::new(false),
            root,
            NodeKind::ChordDone(vec![
                note(0, 60, NoteName::C, Accidental::Natural),
                note(1, 64, NoteName::E, Accidental::Natural),
                note(2, 67, NoteName::G, Accidental::Natural),
            ]),
        );
        assert_eq!(chord.spelled().len(), 3);
        assert!(!chord.in_chord());
    }
}
