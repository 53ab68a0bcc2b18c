//! Best-path search over the spellings of one bar.
//!
//! Uniform-cost search from a single initial node. Costs never decrease along
//! an edge, so the first terminal popped is optimal; terminals of equal cost
//! popped after it are kept as ties, and the search stops at the first
//! terminal that costs more.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::ops::Range;
use std::rc::Rc;

use spellconf::{Branching, SearchConfig};
use tracing::trace;

use crate::cost::Cost;
use crate::enharmonic::EnharmonicTable;
use crate::enumerator::NoteEnumerator;
use crate::node::PathNode;
use crate::state::{AccidentalState, StateScope};
use crate::tonality::Tonality;
use crate::transition::TransitionGenerator;

/// Search settings shared by every bag of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Seed the accidental state from the key signature only.
    pub tonal: bool,
    pub scope: StateScope,
    pub table: EnharmonicTable,
    pub branching: Branching,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl SearchOptions {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            tonal: config.tonal,
            scope: if config.octave_scoped {
                StateScope::Octave
            } else {
                StateScope::Letter
            },
            table: EnharmonicTable::new(config.enharmonics),
            branching: config.branching,
        }
    }
}

struct Queued<C> {
    node: Rc<PathNode<C>>,
    seq: u64,
}

/// Exploration order: cheaper first, then further advanced, then first queued.
fn explore_order<C: Cost>(a: &Queued<C>, b: &Queued<C>) -> Ordering {
    a.node
        .cost()
        .compare(b.node.cost())
        .then_with(|| b.node.id().cmp(&a.node.id()))
        .then_with(|| a.seq.cmp(&b.seq))
}

impl<C: Cost> PartialEq for Queued<C> {
    fn eq(&self, other: &Self) -> bool {
        explore_order(self, other) == Ordering::Equal
    }
}

impl<C: Cost> Eq for Queued<C> {}

impl<C: Cost> PartialOrd for Queued<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: Cost> Ord for Queued<C> {
    // BinaryHeap pops the greatest element
    fn cmp(&self, other: &Self) -> Ordering {
        explore_order(other, self)
    }
}

/// The minimal-cost spellings of one bar under one tonality.
///
/// Immutable once built. An empty bar gives an empty bag.
#[derive(Debug)]
pub struct PathSearch<C> {
    best: Vec<Rc<PathNode<C>>>,
    cost: Option<C>,
    iterations: usize,
}

impl<C: Cost> PathSearch<C> {
    pub fn new<E: NoteEnumerator + ?Sized>(
        notes: &E,
        bar: Range<usize>,
        global: &Tonality,
        local: Option<&Tonality>,
        seed: &C,
        options: &SearchOptions,
    ) -> Self {
        let mut search = Self {
            best: Vec::new(),
            cost: None,
            iterations: 0,
        };
        if bar.is_empty() {
            return search;
        }

        let generator = TransitionGenerator::new(
            notes,
            options.table,
            options.branching,
            global,
            local,
            bar.end,
        );
        let state = AccidentalState::from_tonality(global, options.tonal, options.scope);
        let mut queue = BinaryHeap::new();
        let mut seq = 0u64;
        queue.push(Queued {
            node: Rc::new(PathNode::initial(bar.start, state, seed)),
            seq,
        });

        while let Some(Queued { node, .. }) = queue.pop() {
            search.iterations += 1;

            if node.id() == bar.end {
                match &search.cost {
                    None => {
                        search.cost = Some(node.cost().clone());
                        search.best.push(node);
                    }
                    Some(best) if !best.less(node.cost()) => search.best.push(node),
                    Some(_) => break,
                }
                continue;
            }

            if let Some(best) = &search.cost {
                if best.less(node.cost()) {
                    continue;
                }
            }

            for succ in generator.successors(&node) {
                seq += 1;
                queue.push(Queued {
                    node: Rc::new(succ),
                    seq,
                });
            }
        }

        trace!(
            ton = %global,
            start = bar.start,
            end = bar.end,
            ties = search.best.len(),
            iterations = search.iterations,
            "bag searched"
        );
        search
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    /// Number of tied best spellings.
    pub fn len(&self) -> usize {
        self.best.len()
    }

    /// Cost shared by every spelling in the bag, `None` when empty.
    pub fn cost(&self) -> Option<&C> {
        self.cost.as_ref()
    }

    /// First best spelling found.
    pub fn top(&self) -> Option<&Rc<PathNode<C>>> {
        self.best.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<PathNode<C>>> {
        self.best.iter()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}
