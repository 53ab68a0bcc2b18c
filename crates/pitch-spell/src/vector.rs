//! One bar searched under every candidate tonality.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use spellconf::LocalDistance;

use crate::cost::Cost;
use crate::enumerator::NoteEnumerator;
use crate::search::{PathSearch, SearchOptions};
use crate::ton_index::TonalityIndex;
use crate::tonality::Tonality;

/// Outcome of a tonality estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    /// Row of the chosen tonality in the index.
    pub index: usize,
    /// Several candidates were still equal after every tie-break.
    pub ambiguous: bool,
}

impl Estimate {
    pub fn clear(index: usize) -> Self {
        Self {
            index,
            ambiguous: false,
        }
    }
}

/// First minimum of `key` over `candidates`, flagged when the minimum is shared.
pub(crate) fn pick_min<K: Ord>(candidates: &[usize], key: impl Fn(usize) -> K) -> Option<Estimate> {
    let mut best: Option<(usize, K)> = None;
    let mut ambiguous = false;
    for &j in candidates {
        let k = key(j);
        let better = match &best {
            None => true,
            Some((_, bk)) => {
                if k == *bk {
                    ambiguous = true;
                }
                k < *bk
            }
        };
        if better {
            best = Some((j, k));
            ambiguous = false;
        }
    }
    best.map(|(index, _)| Estimate { index, ambiguous })
}

pub(crate) fn tonality_distance(kind: LocalDistance, a: &Tonality, b: &Tonality) -> u32 {
    match kind {
        LocalDistance::Diatonic => a.distance_diatonic(b),
        LocalDistance::Weber => a.distance_weber(b),
    }
}

/// Bags of one bar, one per row of the tonality index.
///
/// The first pass fills every row without a local tonality. The second pass
/// only fills the rows of global candidates, each with its own local tonality.
#[derive(Debug)]
pub struct SpellVector<C> {
    bar: usize,
    notes: Range<usize>,
    bags: Vec<Option<PathSearch<C>>>,
}

impl<C: Cost> SpellVector<C> {
    /// First pass: every tonality of `index`, local tonality unknown.
    pub fn new<E: NoteEnumerator + ?Sized>(
        notes: &E,
        bar: usize,
        range: Range<usize>,
        index: &TonalityIndex,
        seed: &C,
        options: &SearchOptions,
    ) -> Self {
        let bags = index
            .iter()
            .map(|ton| Some(PathSearch::new(notes, range.clone(), ton, None, seed, options)))
            .collect();
        Self {
            bar,
            notes: range,
            bags,
        }
    }

    /// Second pass: one bag per `(global, local)` pair of rows.
    pub fn respell<E: NoteEnumerator + ?Sized>(
        notes: &E,
        bar: usize,
        range: Range<usize>,
        index: &TonalityIndex,
        rows: &[(usize, usize)],
        seed: &C,
        options: &SearchOptions,
    ) -> Self {
        let mut bags: Vec<Option<PathSearch<C>>> = (0..index.len()).map(|_| None).collect();
        for &(global, local) in rows {
            bags[global] = Some(PathSearch::new(
                notes,
                range.clone(),
                index.ton(global),
                Some(index.ton(local)),
                seed,
                options,
            ));
        }
        Self {
            bar,
            notes: range,
            bags,
        }
    }

    /// Bar number.
    pub fn bar(&self) -> usize {
        self.bar
    }

    pub fn notes(&self) -> Range<usize> {
        self.notes.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn bag(&self, row: usize) -> Option<&PathSearch<C>> {
        self.bags.get(row).and_then(|b| b.as_ref())
    }

    pub fn cost(&self, row: usize) -> Option<&C> {
        self.bag(row).and_then(|b| b.cost())
    }

    /// Local tonality of this bar assuming global tonality `global`.
    ///
    /// Minimizes the bag cost; ties go to the row closest to `prev` (the
    /// local tonality of the previous bar), then closest to `global`, then
    /// with the fewest accidentals in its key signature. An empty bar keeps
    /// `prev`. `None` when no row has a spelling.
    pub fn estimate_local(
        &self,
        index: &TonalityIndex,
        global: usize,
        prev: usize,
        distance: LocalDistance,
    ) -> Option<Estimate> {
        if self.is_empty() {
            return Some(Estimate::clear(prev));
        }
        let rows: Vec<usize> = (0..self.bags.len())
            .filter(|&j| self.cost(j).is_some())
            .collect();
        let min = rows
            .iter()
            .filter_map(|&j| self.cost(j))
            .fold(None::<&C>, |m, c| match m {
                Some(m) if !c.less(m) => Some(m),
                _ => Some(c),
            })?;
        let tied: Vec<usize> = rows
            .into_iter()
            .filter(|&j| self.cost(j).map_or(false, |c| !min.less(c)))
            .collect();

        let prev_ton = index.ton(prev);
        let global_ton = index.ton(global);
        pick_min(&tied, |j| {
            let ton = index.ton(j);
            (
                tonality_distance(distance, prev_ton, ton),
                tonality_distance(distance, global_ton, ton),
                ton.fifths().unsigned_abs(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::AccidCost;
    use crate::enumerator::NoteSequence;

    #[test]
    fn test_pick_min_flags_ties() {
        let est = pick_min(&[4, 7, 9], |j| j % 2).unwrap();
        assert_eq!(est, Estimate { index: 4, ambiguous: false });

        let est = pick_min(&[3, 5, 8], |j| j % 2).unwrap();
        assert_eq!(est, Estimate { index: 8, ambiguous: false });

        let est = pick_min(&[3, 5], |j| j % 2).unwrap();
        assert_eq!(est, Estimate { index: 3, ambiguous: true });

        assert!(pick_min(&[], |j| j).is_none());
    }

    #[test]
    fn test_local_follows_the_bar() {
        let index = TonalityIndex::default30();
        // G A B C D E F#: G major territory
        let notes = NoteSequence::from_bars(&[&[67, 69, 71, 72, 74, 76, 78]]);
        let vector = SpellVector::new(&notes, 0, 0..7, &index, &AccidCost::new(false), &SearchOptions::default());

        let c_major = index.find(&Tonality::major(0).unwrap()).unwrap();
        let g_major = index.find(&Tonality::major(1).unwrap()).unwrap();
        let local = vector.estimate_local(&index, c_major, c_major, LocalDistance::Diatonic).unwrap();
        assert_eq!(local.index, g_major);
        assert!(!local.ambiguous);
    }

    fn majors(fifths: &[i8]) -> TonalityIndex {
        let mut index = TonalityIndex::new();
        for &f in fifths {
            index.add(Tonality::major(f).unwrap(), true).unwrap();
        }
        index.close();
        index
    }

    fn vector(index: &TonalityIndex, bar: &[u8]) -> SpellVector<AccidCost> {
        let notes = NoteSequence::from_bars(&[bar]);
        SpellVector::new(&notes, 0, 0..bar.len(), index, &AccidCost::new(false), &SearchOptions::default())
    }

    #[test]
    fn test_local_tie_goes_to_previous_local() {
        // C E G: no sign in any of the three
        let index = majors(&[0, 1, -1]);
        let v = vector(&index, &[60, 64, 67]);
        assert_eq!(v.cost(0), v.cost(1));
        assert_eq!(v.cost(0), v.cost(2));

        // the global would pick C, the previous bar was in G
        let local = v.estimate_local(&index, 0, 1, LocalDistance::Diatonic).unwrap();
        assert_eq!(local, Estimate::clear(1));
        let local = v.estimate_local(&index, 0, 2, LocalDistance::Diatonic).unwrap();
        assert_eq!(local, Estimate::clear(2));
    }

    #[test]
    fn test_local_tie_then_goes_to_global() {
        // F# Bb: one sign in G, F, D and Bb, two in C
        let index = majors(&[0, 1, -1, 2, -2]);
        let v = vector(&index, &[66, 70]);
        assert_eq!(v.cost(0).map(|c| c.accidentals()), Some(2));
        for row in 1..5 {
            assert_eq!(v.cost(row).map(|c| c.accidentals()), Some(1));
        }

        // C is one step from G and F, two from D and Bb
        let under_d = v.estimate_local(&index, 3, 0, LocalDistance::Diatonic).unwrap();
        assert_eq!(under_d, Estimate::clear(1));
        let under_bb = v.estimate_local(&index, 4, 0, LocalDistance::Diatonic).unwrap();
        assert_eq!(under_bb, Estimate::clear(2));
    }

    #[test]
    fn test_local_tie_then_goes_to_fewest_signs() {
        // F C#: one sign in C and D, two in G
        let index = majors(&[2, 1, 0]);
        let v = vector(&index, &[65, 73]);
        assert_eq!(v.cost(1).map(|c| c.accidentals()), Some(2));

        // G is one step from both C and D
        let local = v.estimate_local(&index, 1, 1, LocalDistance::Diatonic).unwrap();
        assert_eq!(local, Estimate::clear(2));
    }

    #[test]
    fn test_unresolved_local_tie_is_flagged() {
        let index = majors(&[0, 1, -1]);
        let v = vector(&index, &[66, 70]);
        let local = v.estimate_local(&index, 0, 0, LocalDistance::Diatonic).unwrap();
        // G and F agree on every criterion, the first row is kept
        assert_eq!(local, Estimate { index: 1, ambiguous: true });
    }

    #[test]
    fn test_empty_bar_keeps_previous_local() {
        let index = TonalityIndex::default30();
        let notes = NoteSequence::from_bars(&[&[60]]);
        let vector = SpellVector::new(&notes, 3, 1..1, &index, &AccidCost::new(false), &SearchOptions::default());
        assert!(vector.is_empty());
        assert_eq!(vector.bar(), 3);
        let local = vector.estimate_local(&index, 7, 12, LocalDistance::Diatonic).unwrap();
        assert_eq!(local, Estimate::clear(12));
    }
}
