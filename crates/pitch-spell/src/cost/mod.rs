//! Cost models for spelling paths.
//!
//! A cost is a small aggregate of counters updated note by note. Every model
//! shares the same contract: a zero value, a strict order consistent with
//! equality, commutative addition and an `update` that only ever increments.
//! One run of the engine uses a single model; the search is generic over it.

mod accid;
mod dist;
mod tiebreak;

pub use accid::AccidCost;
pub use dist::{DistCost, DistPlusCost};
pub use tiebreak::{TieBreakCost, TieBreaks};

use std::cmp::Ordering;
use std::fmt;

use crate::pitch::{Accidental, NoteName};
use crate::state::AccidentalState;
use crate::tonality::Tonality;

/// One spelled note, as seen by a cost update.
#[derive(Debug, Clone, Copy)]
pub struct CostStep<'a> {
    pub name: NoteName,
    pub accidental: Accidental,
    /// The accidental has to be written.
    pub print: bool,
    /// Accidental state after the note.
    pub state: &'a AccidentalState,
    /// Tonality of the bag being searched.
    pub global: &'a Tonality,
    /// Local tonality of the bar, unknown during the first pass.
    pub local: Option<&'a Tonality>,
}

/// Contract shared by all cost models.
///
/// `PartialEq` is the model's equality; `less` must be a strict weak order
/// consistent with it.
pub trait Cost: Clone + fmt::Debug + fmt::Display + PartialEq {
    /// Additive identity carrying the same configuration as `self`.
    fn zero(&self) -> Self;

    fn less(&self, other: &Self) -> bool;

    fn add(&mut self, other: &Self);

    /// Account for one spelled note. Returns whether any counter changed.
    fn update(&mut self, step: &CostStep<'_>) -> bool;

    /// Printed accidental signs counted so far.
    fn accidentals(&self) -> u32;

    /// Signed gap to `other` in percent, on the first field where the two
    /// differ. Negative when `self` is the smaller. See [`relative_gap`].
    fn dist(&self, other: &Self) -> f64;

    fn compare(&self, other: &Self) -> Ordering {
        if self.less(other) {
            Ordering::Less
        } else if other.less(self) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// Difference between two counters in percent of the smaller one.
///
/// Positive when `lhs` is larger, negative when it is smaller, 0 when equal.
/// A zero smaller side gives an infinite gap.
pub fn relative_gap(lhs: f64, rhs: f64) -> f64 {
    debug_assert!(lhs >= 0.0 && rhs >= 0.0);
    let d = lhs - rhs;
    if d < 0.0 {
        d * 100.0 / lhs
    } else if d > 0.0 {
        d * 100.0 / rhs
    } else {
        0.0
    }
}
