//! Accidental memory along a spelling path.
//!
//! The state records, for each letter (or each letter in each octave), which
//! accidental a reader currently assumes. Writing a note whose accidental
//! differs from the assumption changes the state, and that change is what
//! forces an accidental to be printed.

use serde::{Deserialize, Serialize};

use crate::accidentals::AccidentalSet;
use crate::pitch::{Accidental, NoteName};
use crate::tonality::Tonality;

/// Lowest written octave tracked by an octave-scoped state.
pub const MIN_OCTAVE: i8 = -2;
/// Number of octaves tracked by an octave-scoped state (-2 to 9, enough for
/// every spelling of MIDI 0 to 127).
pub const OCTAVES: usize = 12;

/// Whether accidentals persist per letter or per (letter, octave).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateScope {
    Letter,
    Octave,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccidentalState {
    scope: StateScope,
    entries: Vec<AccidentalSet>,
}

impl AccidentalState {
    /// Seed the state from `ton`: key signature only when `tonal`, otherwise
    /// the full scale of its mode.
    pub fn from_tonality(ton: &Tonality, tonal: bool, scope: StateScope) -> Self {
        let row: Vec<AccidentalSet> = NoteName::all()
            .iter()
            .map(|n| {
                if tonal {
                    AccidentalSet::One(ton.accid_key(*n))
                } else {
                    ton.accid_scale(*n)
                }
            })
            .collect();
        let copies = match scope {
            StateScope::Letter => 1,
            StateScope::Octave => OCTAVES,
        };
        let entries = row.iter().copied().cycle().take(7 * copies).collect();
        Self { scope, entries }
    }

    pub fn scope(&self) -> StateScope {
        self.scope
    }

    fn slot(&self, name: NoteName, octave: i8) -> usize {
        match self.scope {
            StateScope::Letter => name.index(),
            StateScope::Octave => {
                let row = (octave - MIN_OCTAVE).clamp(0, OCTAVES as i8 - 1) as usize;
                debug_assert_eq!(row as i8 + MIN_OCTAVE, octave, "octave {} out of range", octave);
                row * 7 + name.index()
            }
        }
    }

    /// Accidentals currently assumed for `name` (octave ignored in letter scope).
    pub fn accidentals(&self, name: NoteName, octave: i8) -> AccidentalSet {
        self.entries[self.slot(name, octave)]
    }

    pub fn member(&self, name: NoteName, accidental: Accidental, octave: i8) -> bool {
        self.accidentals(name, octave).contains(accidental)
    }

    /// Assume `accidental` for `name` from now on.
    ///
    /// Returns false only when the entry already was exactly that accidental;
    /// a pair is always resolved to the written accidental, and reports a change.
    pub fn update(&mut self, accidental: Accidental, name: NoteName, octave: i8) -> bool {
        let slot = self.slot(name, octave);
        let entry = &mut self.entries[slot];
        if entry.is_single() && entry.contains(accidental) {
            false
        } else {
            *entry = AccidentalSet::One(accidental);
            true
        }
    }

    /// Number of entries that differ between two states of the same scope.
    pub fn distance(&self, other: &AccidentalState) -> u32 {
        debug_assert_eq!(self.scope, other.scope);
        self.entries
            .iter()
            .zip(other.entries.iter())
            .filter(|(a, b)| a != b)
            .count() as u32
    }

    /// Number of entries differing from the scale of `ton`.
    pub fn distance_to(&self, ton: &Tonality) -> u32 {
        self.departures(ton, |_| false)
    }

    /// As [`distance_to`](Self::distance_to), leaving out the leading-tone
    /// letters of `ton`.
    pub fn distance_to_except_leads(&self, ton: &Tonality) -> u32 {
        self.departures(ton, |name| ton.lead(name))
    }

    fn departures(&self, ton: &Tonality, skip: impl Fn(NoteName) -> bool) -> u32 {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, set)| (NoteName::all()[i % 7], set))
            .filter(|(name, set)| !skip(*name) && **set != ton.accid_scale(*name))
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tonality::Mode;
    use Accidental::*;

    #[test]
    fn test_update_reports_changes() {
        let c = Tonality::major(0).unwrap();
        let mut state = AccidentalState::from_tonality(&c, true, StateScope::Letter);
        assert!(state.update(Sharp, NoteName::F, 4));
        assert!(!state.update(Sharp, NoteName::F, 4));
        assert_eq!(state.accidentals(NoteName::F, 4), AccidentalSet::One(Sharp));
        assert!(state.update(Natural, NoteName::F, 5));
        assert!(state.member(NoteName::F, Natural, 2));
    }

    #[test]
    fn test_minor_state_distance() {
        let c_minor = Tonality::minor(-3).unwrap();
        let mut state = AccidentalState::from_tonality(&c_minor, false, StateScope::Letter);
        assert_eq!(state.accidentals(NoteName::B, 4), AccidentalSet::One(Natural));
        assert_eq!(state.accidentals(NoteName::A, 4), AccidentalSet::One(Flat));
        assert_eq!(state.distance_to(&c_minor), 0);

        assert!(state.update(Flat, NoteName::B, 4));
        assert_eq!(state.distance_to(&c_minor), 1);
        // B is the leading tone of C minor
        assert_eq!(state.distance_to_except_leads(&c_minor), 0);
        assert!(state.update(Sharp, NoteName::F, 4));
        assert_eq!(state.distance_to_except_leads(&c_minor), 1);
    }

    #[test]
    fn test_tonal_state_uses_signature() {
        let c_minor = Tonality::minor(-3).unwrap();
        let mut state = AccidentalState::from_tonality(&c_minor, true, StateScope::Letter);
        assert_eq!(state.accidentals(NoteName::B, 4), AccidentalSet::One(Flat));
        assert_eq!(state.distance_to(&c_minor), 1);
        assert!(state.update(Natural, NoteName::B, 4));
        assert_eq!(state.distance_to(&c_minor), 0);
    }

    #[test]
    fn test_sharp_minor_keys() {
        let bb_minor = Tonality::minor(-5).unwrap();
        let mut state = AccidentalState::from_tonality(&bb_minor, false, StateScope::Letter);
        assert!(!state.update(Natural, NoteName::A, 4));
        assert!(state.update(Flat, NoteName::A, 4));

        let asharp_minor = Tonality::minor(7).unwrap();
        let mut state = AccidentalState::from_tonality(&asharp_minor, false, StateScope::Letter);
        assert!(!state.update(DoubleSharp, NoteName::G, 3));
        assert!(state.update(Sharp, NoteName::G, 3));
    }

    #[test]
    fn test_pairs_always_print() {
        let blues = Tonality::new(0, Mode::MajorBlues).unwrap();
        let mut state = AccidentalState::from_tonality(&blues, false, StateScope::Letter);
        assert!(state.accidentals(NoteName::E, 4).is_pair());
        assert!(state.update(Flat, NoteName::E, 4));
        assert!(!state.update(Flat, NoteName::E, 4));
    }

    #[test]
    fn test_octave_scope_is_independent() {
        let c = Tonality::major(0).unwrap();
        let mut state = AccidentalState::from_tonality(&c, true, StateScope::Octave);
        assert!(state.update(Sharp, NoteName::C, 4));
        assert!(state.update(Sharp, NoteName::C, 5));
        assert!(!state.update(Sharp, NoteName::C, 4));
        assert_eq!(state.accidentals(NoteName::C, 3), AccidentalSet::One(Natural));

        let fresh = AccidentalState::from_tonality(&c, true, StateScope::Octave);
        assert_eq!(state.distance(&fresh), 2);
    }
}
