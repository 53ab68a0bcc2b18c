//! Sets of admissible accidentals for one letter.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pitch::Accidental;

/// Zero, one or two accidentals allowed for a letter.
///
/// Pairs occur in blues scales, where a letter is sung both flat and natural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AccidentalSet {
    #[default]
    Empty,
    One(Accidental),
    Two(Accidental, Accidental),
}

impl AccidentalSet {
    /// Pair of two accidentals; collapses to a singleton when they agree.
    pub fn pair(a: Accidental, b: Accidental) -> Self {
        if a == b {
            AccidentalSet::One(a)
        } else {
            AccidentalSet::Two(a, b)
        }
    }

    pub fn first(&self) -> Option<Accidental> {
        match *self {
            AccidentalSet::Empty => None,
            AccidentalSet::One(a) | AccidentalSet::Two(a, _) => Some(a),
        }
    }

    pub fn second(&self) -> Option<Accidental> {
        match *self {
            AccidentalSet::Two(_, b) => Some(b),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AccidentalSet::Empty)
    }

    pub fn is_single(&self) -> bool {
        matches!(self, AccidentalSet::One(_))
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, AccidentalSet::Two(_, _))
    }

    pub fn contains(&self, accidental: Accidental) -> bool {
        match *self {
            AccidentalSet::Empty => false,
            AccidentalSet::One(a) => a == accidental,
            AccidentalSet::Two(a, b) => a == accidental || b == accidental,
        }
    }

    /// Add `accidental`, keeping at most two members (the newest replaces the second).
    pub fn with(self, accidental: Accidental) -> Self {
        match self {
            AccidentalSet::Empty => AccidentalSet::One(accidental),
            AccidentalSet::One(a) => AccidentalSet::pair(a, accidental),
            AccidentalSet::Two(a, b) if a == accidental || b == accidental => self,
            AccidentalSet::Two(a, _) => AccidentalSet::Two(a, accidental),
        }
    }
}

impl From<Accidental> for AccidentalSet {
    fn from(a: Accidental) -> Self {
        AccidentalSet::One(a)
    }
}

impl fmt::Display for AccidentalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccidentalSet::Empty => write!(f, "_"),
            AccidentalSet::One(a) => write!(f, "{:?}", a),
            AccidentalSet::Two(a, b) => write!(f, "{:?}|{:?}", a, b),
        }
    }
}
