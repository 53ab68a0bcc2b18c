//! Two-pass estimation of global and local tonalities.
//!
//! Pass 0 searches every bar under every tonality without a local tonality
//! and sums the bag costs per row. The cheapest global rows, and optionally
//! those within a tolerance of the cheapest, become the global candidates;
//! for each of them a local tonality is estimated bar by bar. Pass
//! 1 searches every bar again under each candidate with its locals, and the
//! cheapest candidate after pass 1 is the global tonality whose spelling is
//! committed.

use std::ops::Range;

use spellconf::LocalDistance;
use tracing::{debug, info};

use crate::cost::Cost;
use crate::diagnostics::Diagnostics;
use crate::enumerator::NoteEnumerator;
use crate::extract::PathExtractor;
use crate::grid::LocalGrid;
use crate::search::SearchOptions;
use crate::ton_index::TonalityIndex;
use crate::vector::{pick_min, SpellVector};
use crate::{Result, SpellError};

/// Bars of `notes` in order, with the note range of each.
///
/// Bar numbers missing between two notes give empty ranges.
pub fn bar_ranges<E: NoteEnumerator + ?Sized>(notes: &E) -> Vec<(usize, Range<usize>)> {
    let mut bars: Vec<(usize, Range<usize>)> = Vec::new();
    let mut i = 0;
    while i < notes.len() {
        let bar = notes.bar(i);
        if let Some(last) = bars.last().map(|(b, _)| *b) {
            debug_assert!(last < bar, "bar {} after bar {}", bar, last);
            bars.extend((last + 1..bar).map(|b| (b, i..i)));
        }
        let start = i;
        while i < notes.len() && notes.bar(i) == bar {
            i += 1;
        }
        bars.push((bar, start..i));
    }
    bars
}

pub struct SpellTable<C> {
    index: TonalityIndex,
    seed: C,
    options: SearchOptions,
    distance: LocalDistance,
    pass0: Vec<SpellVector<C>>,
    candidates: Vec<usize>,
    grid: LocalGrid,
    pass1: Vec<SpellVector<C>>,
    global: Option<usize>,
    forced: Option<usize>,
    tolerance: f64,
    diagnostics: Diagnostics,
}

impl<C: Cost> SpellTable<C> {
    /// Run pass 0 over `notes`. `index` must be closed.
    pub fn new<E: NoteEnumerator + ?Sized>(
        notes: &E,
        index: TonalityIndex,
        seed: C,
        options: SearchOptions,
        distance: LocalDistance,
        diagnostics: Diagnostics,
    ) -> Result<Self> {
        if notes.is_empty() {
            return Err(SpellError::NoNotes);
        }
        debug_assert!(index.is_closed());
        if !(0..index.len()).any(|i| index.is_global(i)) {
            return Err(SpellError::NoTonality);
        }

        let pass0 = bar_ranges(notes)
            .into_iter()
            .map(|(bar, range)| SpellVector::new(notes, bar, range, &index, &seed, &options))
            .collect::<Vec<_>>();
        debug!(bars = pass0.len(), tonalities = index.len(), "pass 0 searched");

        Ok(Self {
            index,
            seed,
            options,
            distance,
            pass0,
            candidates: Vec::new(),
            grid: LocalGrid::default(),
            pass1: Vec::new(),
            global: None,
            forced: None,
            tolerance: 0.0,
            diagnostics,
        })
    }

    /// Keep as global candidates the rows whose first-pass cost is within
    /// `percent` of the best, as measured by [`Cost::dist`].
    pub fn set_global_tolerance(&mut self, percent: f64) {
        debug_assert!(percent >= 0.0);
        self.tolerance = percent;
    }

    /// Skip the global estimation and spell under row `row`.
    pub fn set_global(&mut self, row: usize) -> Result<()> {
        if row >= self.index.len() {
            return Err(SpellError::NoSuchRow(row));
        }
        self.forced = Some(row);
        Ok(())
    }

    fn row_cost(&self, vectors: &[SpellVector<C>], row: usize) -> C {
        let mut total = self.seed.zero();
        for cost in vectors.iter().filter_map(|v| v.cost(row)) {
            total.add(cost);
        }
        total
    }

    /// Rows of `rows` tied at the minimal summed cost over `vectors`, or
    /// within `tolerance` percent of it.
    fn cheapest(&self, vectors: &[SpellVector<C>], rows: &[usize], tolerance: f64) -> Vec<usize> {
        let costs: Vec<(usize, C)> = rows
            .iter()
            .map(|&i| (i, self.row_cost(vectors, i)))
            .collect();
        let Some(min) = costs
            .iter()
            .map(|(_, c)| c)
            .fold(None::<&C>, |m, c| match m {
                Some(m) if !c.less(m) => Some(m),
                _ => Some(c),
            })
        else {
            return Vec::new();
        };
        costs
            .iter()
            .filter(|(_, c)| !min.less(c) || (tolerance > 0.0 && c.dist(min) <= tolerance))
            .map(|(i, _)| *i)
            .collect()
    }

    /// Among tied rows: fewest accidentals in the key signature, then
    /// major, then sharps.
    fn break_global_tie(&mut self, rows: &[usize], pass: u8) -> Option<usize> {
        let index = &self.index;
        let est = pick_min(rows, |i| {
            let ton = index.ton(i);
            (
                ton.fifths().unsigned_abs(),
                !ton.mode().is_major(),
                -ton.fifths(),
            )
        })?;
        if est.ambiguous {
            let message = format!(
                "global tonality tied after pass {}, keeping {}",
                pass,
                self.index.ton(est.index)
            );
            self.diagnostics.tie_break_failure(message, None);
        }
        Some(est.index)
    }

    /// Cheapest global rows after pass 0, the favourite first.
    fn global_candidates(&mut self) -> Result<Vec<usize>> {
        let globals: Vec<usize> = (0..self.index.len())
            .filter(|&i| self.index.is_global(i))
            .collect();
        let tied = self.cheapest(&self.pass0, &globals, 0.0);
        let first = self
            .break_global_tie(&tied, 0)
            .ok_or(SpellError::GlobalUndetermined)?;
        let mut candidates = vec![first];
        candidates.extend(
            self.cheapest(&self.pass0, &globals, self.tolerance)
                .into_iter()
                .filter(|&i| i != first),
        );
        info!(
            estimate = %self.index.ton(first),
            candidates = candidates.len(),
            "global tonality after pass 0"
        );
        Ok(candidates)
    }

    /// Global candidates, locals and pass 1.
    pub fn estimate<E: NoteEnumerator + ?Sized>(&mut self, notes: &E) -> Result<usize> {
        let candidates = match self.forced {
            Some(row) => {
                info!(global = %self.index.ton(row), "global tonality forced");
                vec![row]
            }
            None => self.global_candidates()?,
        };

        self.grid = LocalGrid::build(
            &self.pass0,
            &self.index,
            &candidates,
            self.distance,
            &mut self.diagnostics,
        )?;

        let mut pass1 = Vec::with_capacity(self.pass0.len());
        for (b, vector) in self.pass0.iter().enumerate() {
            let rows: Vec<(usize, usize)> = self
                .grid
                .rows()
                .iter()
                .map(|row| (row.global, row.locals[b]))
                .collect();
            pass1.push(SpellVector::respell(
                notes,
                vector.bar(),
                vector.notes(),
                &self.index,
                &rows,
                &self.seed,
                &self.options,
            ));
        }
        self.pass1 = pass1;

        let best = self.cheapest(&self.pass1, &candidates, 0.0);
        let global = self
            .break_global_tie(&best, 1)
            .ok_or(SpellError::GlobalUndetermined)?;
        info!(
            global = %self.index.ton(global),
            cost = %self.row_cost(&self.pass1, global),
            "global tonality after pass 1"
        );
        self.candidates = candidates;
        self.global = Some(global);
        Ok(global)
    }

    /// Commit the best spelling of every bar under the estimated global tonality.
    pub fn rename<E: NoteEnumerator + ?Sized>(&mut self, notes: &mut E) -> Result<()> {
        let global = self.global.ok_or(SpellError::GlobalUndetermined)?;
        let mut unspelled = Vec::new();
        for vector in &self.pass1 {
            if vector.is_empty() {
                continue;
            }
            let Some(bag) = vector.bag(global).filter(|b| !b.is_empty()) else {
                self.diagnostics.error(
                    format!("no spelling under {}", self.index.ton(global)),
                    Some(vector.bar()),
                );
                unspelled.push(vector.bar());
                continue;
            };
            if bag.len() > 1 {
                self.diagnostics.tie_break_failure(
                    format!("{} spellings of equal cost, keeping the first", bag.len()),
                    Some(vector.bar()),
                );
            }
            if let Some(top) = bag.top() {
                PathExtractor::new(top.as_ref()).rename(notes);
            }
        }
        if unspelled.is_empty() {
            Ok(())
        } else {
            Err(SpellError::Unspelled { bars: unspelled })
        }
    }

    pub fn index(&self) -> &TonalityIndex {
        &self.index
    }

    /// Estimated global row, once [`estimate`](Self::estimate) succeeded.
    pub fn global(&self) -> Option<usize> {
        self.global
    }

    /// Global rows tied after pass 0, the pass-0 favourite first.
    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    pub fn grid(&self) -> &LocalGrid {
        &self.grid
    }

    /// Locals per bar under the estimated global tonality.
    pub fn locals(&self) -> Vec<usize> {
        self.global
            .and_then(|g| self.grid.locals(g))
            .map(|l| l.to_vec())
            .unwrap_or_default()
    }

    pub fn bars(&self) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        self.pass0.iter().map(|v| (v.bar(), v.notes()))
    }

    /// Summed pass-0 cost of a row.
    pub fn first_pass_cost(&self, row: usize) -> C {
        self.row_cost(&self.pass0, row)
    }

    /// Summed pass-1 cost of a global candidate.
    pub fn second_pass_cost(&self, row: usize) -> C {
        self.row_cost(&self.pass1, row)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::AccidCost;
    use crate::enumerator::NoteSequence;
    use crate::tonality::Tonality;
    use pretty_assertions::assert_eq;

    fn table(notes: &NoteSequence, index: TonalityIndex) -> SpellTable<AccidCost> {
        SpellTable::new(
            notes,
            index,
            AccidCost::new(false),
            SearchOptions::default(),
            LocalDistance::Diatonic,
            Diagnostics::new(true),
        )
        .unwrap()
    }

    #[test]
    fn test_bar_ranges_fill_gaps() {
        let mut notes = NoteSequence::new();
        notes.push(0, 60);
        notes.push(0, 62);
        notes.push(2, 64);
        let bars = bar_ranges(&notes);
        assert_eq!(bars, vec![(0, 0..2), (1, 2..2), (2, 2..3)]);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let notes = NoteSequence::new();
        let result = SpellTable::new(
            &notes,
            TonalityIndex::default30(),
            AccidCost::new(false),
            SearchOptions::default(),
            LocalDistance::Diatonic,
            Diagnostics::new(true),
        );
        assert!(matches!(result, Err(SpellError::NoNotes)));
    }

    #[test]
    fn test_white_keys_are_c_major() {
        let mut notes = NoteSequence::new();
        notes.push_bar(&[60, 62, 64, 65, 67, 69, 71, 72]);
        notes.push_bar(&[71, 69, 67, 65, 64, 62, 60]);
        let mut table = table(&notes, TonalityIndex::default30());

        let global = table.estimate(&notes).unwrap();
        assert_eq!(table.index().get(global), Some(&Tonality::major(0).unwrap()));
        // A minor shares the signature and ties on pass 0
        assert!(table.candidates().len() >= 2);
        assert_eq!(table.candidates()[0], global);

        table.rename(&mut notes).unwrap();
        assert_eq!(notes.spelled().count(), notes.len());
        assert_eq!(notes.printed_accidentals(), 0);
    }

    #[test]
    fn test_global_tie_prefers_fewer_accidentals() {
        // F# major and Gb major spell this equally well
        let mut index = TonalityIndex::new();
        index.add(Tonality::major(6).unwrap(), true).unwrap();
        index.add(Tonality::major(-6).unwrap(), true).unwrap();
        index.add(Tonality::major(-1).unwrap(), true).unwrap();
        index.close();
        let mut notes = NoteSequence::new();
        notes.push_bar(&[66, 68, 70, 71, 73, 75, 77]);
        let mut table = table(&notes, index);

        let global = table.estimate(&notes).unwrap();
        assert_eq!(table.candidates().len(), 2);
        // |6| == |-6| and both major: the sharp key wins
        assert_eq!(table.index().get(global), Some(&Tonality::major(6).unwrap()));
        assert_eq!(table.diagnostics().tie_break_failures(), 0);
    }

    fn c_and_g() -> TonalityIndex {
        let mut index = TonalityIndex::new();
        index.add(Tonality::major(0).unwrap(), true).unwrap();
        index.add(Tonality::major(1).unwrap(), true).unwrap();
        index.close();
        index
    }

    #[test]
    fn test_tolerance_keeps_near_candidates() {
        // one sign in C major, two in G major (F natural and B flat)
        let mut notes = NoteSequence::new();
        notes.push_bar(&[60, 62, 64, 65, 67, 69, 71, 70]);

        let mut exact = table(&notes, c_and_g());
        assert_eq!(exact.estimate(&notes).unwrap(), 0);
        assert_eq!(exact.candidates(), &[0]);

        let mut half = table(&notes, c_and_g());
        half.set_global_tolerance(50.0);
        half.estimate(&notes).unwrap();
        assert_eq!(half.candidates(), &[0]);

        // 2 is 100% above 1
        let mut wide = table(&notes, c_and_g());
        wide.set_global_tolerance(100.0);
        assert_eq!(wide.estimate(&notes).unwrap(), 0);
        assert_eq!(wide.candidates(), &[0, 1]);
        assert_eq!(wide.grid().len(), 2);
    }

    #[test]
    fn test_forced_global() {
        let mut notes = NoteSequence::new();
        notes.push_bar(&[60, 62, 64, 65, 67, 69, 71, 72]);
        let index = TonalityIndex::default30();
        let g_major = index.find(&Tonality::major(1).unwrap()).unwrap();
        let mut table = table(&notes, index);

        assert!(matches!(table.set_global(99), Err(SpellError::NoSuchRow(99))));
        table.set_global(g_major).unwrap();
        assert_eq!(table.estimate(&notes).unwrap(), g_major);
        assert_eq!(table.candidates(), &[g_major]);

        table.rename(&mut notes).unwrap();
        // the F needs its natural sign
        assert_eq!(notes.printed_accidentals(), 1);
    }
}
