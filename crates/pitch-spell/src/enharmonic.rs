//! Enharmonic spellings of each pitch class.

use spellconf::EnharmonicFilter;

use crate::pitch::{Accidental, NoteName};

use Accidental::*;
use NoteName::*;

type Spelling = Option<(NoteName, Accidental)>;

/// For each pitch class: flat-side spelling, common spelling, sharp-side spelling.
const FULL: [[Spelling; 3]; 12] = [
    [Some((D, DoubleFlat)), Some((C, Natural)), Some((B, Sharp))],
    [Some((D, Flat)), Some((C, Sharp)), Some((B, DoubleSharp))],
    [Some((E, DoubleFlat)), Some((D, Natural)), Some((C, DoubleSharp))],
    [Some((F, DoubleFlat)), Some((E, Flat)), Some((D, Sharp))],
    [Some((F, Flat)), Some((E, Natural)), Some((D, DoubleSharp))],
    [Some((G, DoubleFlat)), Some((F, Natural)), Some((E, Sharp))],
    [Some((G, Flat)), Some((F, Sharp)), Some((E, DoubleSharp))],
    [Some((A, DoubleFlat)), Some((G, Natural)), Some((F, DoubleSharp))],
    [Some((A, Flat)), Some((G, Sharp)), None],
    [Some((B, DoubleFlat)), Some((A, Natural)), Some((G, DoubleSharp))],
    [Some((C, DoubleFlat)), Some((B, Flat)), Some((A, Sharp))],
    [Some((C, Flat)), Some((B, Natural)), Some((A, DoubleSharp))],
];

fn is_rare(name: NoteName, accidental: Accidental) -> bool {
    matches!(
        (name, accidental),
        (C, Flat) | (B, Sharp) | (E, Sharp) | (F, Flat)
    )
}

/// O(1) lookup of enharmonic candidates, restricted by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnharmonicTable {
    filter: EnharmonicFilter,
}

impl Default for EnharmonicTable {
    fn default() -> Self {
        Self::new(EnharmonicFilter::Full)
    }
}

impl EnharmonicTable {
    pub fn new(filter: EnharmonicFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> EnharmonicFilter {
        self.filter
    }

    /// The filter keeps this spelling.
    pub fn allows(&self, name: NoteName, accidental: Accidental) -> bool {
        match self.filter {
            EnharmonicFilter::Full => true,
            EnharmonicFilter::Short => !matches!(
                (name, accidental),
                (B, DoubleSharp) | (F, DoubleFlat) | (E, DoubleSharp)
            ),
            EnharmonicFilter::NoDouble => !accidental.is_double(),
            EnharmonicFilter::NoRare => !is_rare(name, accidental),
            EnharmonicFilter::Restricted => !accidental.is_double() && !is_rare(name, accidental),
        }
    }

    /// Candidate `index` (0..=2) for `pitch_class`, `None` when undefined or filtered out.
    pub fn lookup(&self, pitch_class: usize, index: usize) -> Option<(NoteName, Accidental)> {
        let (name, accidental) = (*FULL.get(pitch_class % 12)?.get(index)?)?;
        self.allows(name, accidental).then_some((name, accidental))
    }

    /// Defined candidates for `pitch_class`, flat side first.
    pub fn candidates(&self, pitch_class: usize) -> impl Iterator<Item = (NoteName, Accidental)> + '_ {
        (0..3).filter_map(move |i| self.lookup(pitch_class, i))
    }
}
