//! Successor generation for the spelling search.
//!
//! A single note branches over its enharmonic candidates. A chord is spelled
//! pitch class by pitch class, ascending from the bass; a pitch class already
//! spelled in the chord reuses its letter, and a new one may not give a letter
//! a second accidental. Only completed chords leave the generator.

use std::rc::Rc;

use spellconf::Branching;
use tracing::trace;

use crate::cost::{Cost, CostStep};
use crate::enharmonic::EnharmonicTable;
use crate::enumerator::{NoteEnumerator, SpelledNote};
use crate::node::{ChordProgress, NodeKind, PathNode};
use crate::pitch::{octave_of, pitch_class, Accidental, NoteName, Pitch};
use crate::state::AccidentalState;
use crate::tonality::Tonality;

pub struct TransitionGenerator<'a, E: ?Sized> {
    notes: &'a E,
    table: EnharmonicTable,
    branching: Branching,
    global: &'a Tonality,
    local: Option<&'a Tonality>,
    /// End of the bar being searched.
    stop: usize,
}

impl<'a, E: NoteEnumerator + ?Sized> TransitionGenerator<'a, E> {
    pub fn new(
        notes: &'a E,
        table: EnharmonicTable,
        branching: Branching,
        global: &'a Tonality,
        local: Option<&'a Tonality>,
        stop: usize,
    ) -> Self {
        debug_assert!(stop <= notes.len());
        Self {
            notes,
            table,
            branching,
            global,
            local,
            stop,
        }
    }

    pub fn stop(&self) -> usize {
        self.stop
    }

    /// One past the last note of the chord starting at `i` (`i + 1` for a single note).
    pub fn chord_end(&self, i: usize) -> usize {
        let mut j = i;
        while j + 1 < self.stop && self.notes.simultaneous(j) {
            j += 1;
        }
        j + 1
    }

    fn candidates(&self, pc: usize) -> Vec<(NoteName, Accidental)> {
        if self.branching == Branching::Chromatic {
            match self.global.chromatic_spelling(pc) {
                Some((name, acc)) if self.table.allows(name, acc) => return vec![(name, acc)],
                _ => trace!(pc, ton = %self.global, "no chromatic spelling, branching"),
            }
        }
        self.table.candidates(pc).collect()
    }

    fn step<C: Cost>(
        &self,
        state: &AccidentalState,
        cost: &C,
        i: usize,
        name: NoteName,
        accidental: Accidental,
        force_print: bool,
    ) -> (AccidentalState, C, SpelledNote) {
        let midi = self.notes.midi(i);
        let octave = octave_of(midi, name, accidental);
        let mut state = state.clone();
        let print = state.update(accidental, name, octave) || force_print;
        let mut cost = cost.clone();
        cost.update(&CostStep {
            name,
            accidental,
            print,
            state: &state,
            global: self.global,
            local: self.local,
        });
        let note = SpelledNote {
            index: i,
            midi,
            pitch: Pitch::new(name, accidental, octave),
            print,
        };
        (state, cost, note)
    }

    /// All successors of `node` that end on a single note or a completed chord.
    pub fn successors<C: Cost>(&self, node: &Rc<PathNode<C>>) -> Vec<PathNode<C>> {
        let i = node.id();
        if i >= self.stop {
            return Vec::new();
        }
        let end = self.chord_end(i);
        if end == i + 1 {
            self.single(node)
        } else {
            self.chord(node, end)
        }
    }

    fn single<C: Cost>(&self, node: &Rc<PathNode<C>>) -> Vec<PathNode<C>> {
        let i = node.id();
        let pc = pitch_class(self.notes.midi(i));
        self.candidates(pc)
            .into_iter()
            .map(|(name, acc)| {
                let (state, cost, note) = self.step(node.state(), node.cost(), i, name, acc, false);
                PathNode::successor(i + 1, state, cost, Rc::clone(node), NodeKind::Single(note))
            })
            .collect()
    }

    /// Chord notes sorted by pitch class above the bass, then by index.
    fn chord_order(&self, start: usize, end: usize) -> Vec<usize> {
        let bass = (start..end)
            .min_by_key(|&i| (self.notes.midi(i), i))
            .map(|i| pitch_class(self.notes.midi(i)))
            .unwrap_or(0);
        let mut order: Vec<usize> = (start..end).collect();
        order.sort_by_key(|&i| ((pitch_class(self.notes.midi(i)) + 12 - bass) % 12, i));
        order
    }

    fn chord<C: Cost>(&self, anchor: &Rc<PathNode<C>>, end: usize) -> Vec<PathNode<C>> {
        let progress = ChordProgress::new(self.chord_order(anchor.id(), end));
        let mut work = self.chord_step(anchor, anchor.state(), anchor.cost(), &progress);
        let mut done = Vec::new();

        while let Some(node) = work.pop() {
            match node.kind() {
                NodeKind::ChordPartial(progress) => {
                    work.extend(self.chord_step(anchor, node.state(), node.cost(), progress));
                }
                _ => done.push(node),
            }
        }
        trace!(start = anchor.id(), end, spellings = done.len(), "chord spelled");
        done
    }

    fn chord_step<C: Cost>(
        &self,
        anchor: &Rc<PathNode<C>>,
        state: &AccidentalState,
        cost: &C,
        progress: &ChordProgress,
    ) -> Vec<PathNode<C>> {
        let Some(i) = progress.next() else {
            return Vec::new();
        };
        let pc = pitch_class(self.notes.midi(i));
        let choices: Vec<(NoteName, Accidental, bool)> = match progress.chosen[pc] {
            Some(seen) => vec![seen],
            None => self
                .candidates(pc)
                .into_iter()
                .filter(|(name, acc)| progress.consistent(*name, *acc))
                .map(|(name, acc)| (name, acc, false))
                .collect(),
        };

        choices
            .into_iter()
            .map(|(name, acc, force_print)| {
                let (state, cost, note) = self.step(state, cost, i, name, acc, force_print);
                let mut next = progress.clone();
                if next.chosen[pc].is_none() {
                    next.chosen[pc] = Some((name, acc, note.print));
                }
                next.notes.push(note);
                let id = anchor.id() + next.notes.len();
                let kind = if next.is_complete() {
                    let mut notes = next.notes;
                    notes.sort_by_key(|n| n.index);
                    NodeKind::ChordDone(notes)
                } else {
                    NodeKind::ChordPartial(next)
                };
                PathNode::successor(id, state, cost, Rc::clone(anchor), kind)
            })
            .collect()
    }
}
