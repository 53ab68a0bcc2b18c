//! Tonalities: key signature plus mode, and the scales derived from them.
//!
//! A tonality is stored as its key signature (`fifths`, -7 flats to 7 sharps)
//! and a mode. The tonic is found on the circle of fifths at
//! `fifths + mode.tonic_offset()`, so `(-3, Minor)` is C harmonic minor and
//! `(0, Dorian)` is D dorian.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::accidentals::AccidentalSet;
use crate::pitch::{Accidental, NoteName};
use crate::weber;
use crate::{Result, SpellError};

/// Letter offset from the tonic for each semitone of the chromatic-harmonic scale.
const CHROMATIC_STEPS: [i32; 12] = [0, 1, 1, 2, 2, 3, 3, 4, 5, 5, 6, 6];

/// (letter steps, semitones) above the tonic.
const MAJOR_BLUES: [(i32, i32); 6] = [(0, 0), (1, 2), (2, 3), (2, 4), (4, 7), (5, 9)];
const MINOR_BLUES: [(i32, i32); 6] = [(0, 0), (2, 3), (3, 5), (4, 6), (4, 7), (6, 10)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Major,
    /// Harmonic minor
    Minor,
    MinorNatural,
    MinorMelodic,
    Ionian,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    Locrian,
    MajorBlues,
    MinorBlues,
}

impl Mode {
    /// Position of the tonic on the circle of fifths relative to the key signature.
    pub fn tonic_offset(self) -> i32 {
        match self {
            Mode::Major | Mode::Ionian | Mode::MajorBlues => 0,
            Mode::Lydian => -1,
            Mode::Mixolydian => 1,
            Mode::Dorian => 2,
            Mode::Minor
            | Mode::MinorNatural
            | Mode::MinorMelodic
            | Mode::Aeolian
            | Mode::MinorBlues => 3,
            Mode::Phrygian => 4,
            Mode::Locrian => 5,
        }
    }

    /// Major or harmonic minor, the modes of the default tonality lists.
    pub fn is_tonal(self) -> bool {
        matches!(self, Mode::Major | Mode::Minor)
    }

    pub fn is_major(self) -> bool {
        matches!(self, Mode::Major | Mode::Ionian)
    }

    pub fn is_blues(self) -> bool {
        matches!(self, Mode::MajorBlues | Mode::MinorBlues)
    }

    /// Parse mode from string (case-insensitive, allows abbreviations)
    pub fn parse(s: &str) -> Option<Mode> {
        match s.to_lowercase().as_str() {
            "maj" | "major" | "" => Some(Mode::Major),
            "min" | "minor" | "m" | "harmonic" => Some(Mode::Minor),
            "natural" | "minor_natural" => Some(Mode::MinorNatural),
            "melodic" | "minor_melodic" => Some(Mode::MinorMelodic),
            "ion" | "ionian" => Some(Mode::Ionian),
            "dor" | "dorian" => Some(Mode::Dorian),
            "phr" | "phrygian" => Some(Mode::Phrygian),
            "lyd" | "lydian" => Some(Mode::Lydian),
            "mix" | "mixolydian" => Some(Mode::Mixolydian),
            "aeo" | "aeolian" => Some(Mode::Aeolian),
            "loc" | "locrian" => Some(Mode::Locrian),
            "blues" | "major_blues" => Some(Mode::MajorBlues),
            "minor_blues" => Some(Mode::MinorBlues),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
            Mode::MinorNatural => "natural minor",
            Mode::MinorMelodic => "melodic minor",
            Mode::Ionian => "ionian",
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
            Mode::Lydian => "lydian",
            Mode::Mixolydian => "mixolydian",
            Mode::Aeolian => "aeolian",
            Mode::Locrian => "locrian",
            Mode::MajorBlues => "major blues",
            Mode::MinorBlues => "minor blues",
        };
        f.write_str(s)
    }
}

/// Letter and accidental at position `p` of the circle of fifths (0 = C, 1 = G, -1 = F).
fn fifth_name(p: i32) -> (NoteName, i32) {
    const ORDER: [NoteName; 7] = [
        NoteName::F,
        NoteName::C,
        NoteName::G,
        NoteName::D,
        NoteName::A,
        NoteName::E,
        NoteName::B,
    ];
    let q = p + 1;
    (ORDER[q.rem_euclid(7) as usize], q.div_euclid(7))
}

/// Signed semitone offset in -6..=5 between two pitch classes.
fn pc_offset(pc: i32, natural: i32) -> i32 {
    let d = (pc - natural).rem_euclid(12);
    if d > 6 {
        d - 12
    } else {
        d
    }
}

/// An immutable key: key signature and mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tonality {
    fifths: i8,
    mode: Mode,
}

impl Tonality {
    pub fn new(fifths: i8, mode: Mode) -> Result<Self> {
        if !(-7..=7).contains(&fifths) {
            return Err(SpellError::InvalidTonality {
                fifths,
                mode: mode.to_string(),
            });
        }
        Ok(Self { fifths, mode })
    }

    /// Caller guarantees `fifths` is within -7..=7.
    pub(crate) fn new_unchecked(fifths: i8, mode: Mode) -> Self {
        debug_assert!((-7..=7).contains(&fifths));
        Self { fifths, mode }
    }

    pub fn major(fifths: i8) -> Result<Self> {
        Self::new(fifths, Mode::Major)
    }

    pub fn minor(fifths: i8) -> Result<Self> {
        Self::new(fifths, Mode::Minor)
    }

    /// Key signature: positive sharps, negative flats.
    pub fn fifths(&self) -> i8 {
        self.fifths
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Position of the tonic on the circle of fifths.
    pub fn tonic_fifth(&self) -> i32 {
        self.fifths as i32 + self.mode.tonic_offset()
    }

    pub fn tonic_name(&self) -> NoteName {
        fifth_name(self.tonic_fifth()).0
    }

    pub fn tonic_accidental(&self) -> Accidental {
        // tonic positions stay within Fb..B#
        Accidental::from_offset(fifth_name(self.tonic_fifth()).1).unwrap_or(Accidental::Natural)
    }

    pub fn tonic_pitch_class(&self) -> i32 {
        (7 * self.tonic_fifth()).rem_euclid(12)
    }

    /// Accidental of `name` in the key signature.
    pub fn accid_key(&self, name: NoteName) -> Accidental {
        // position in the order of sharps F C G D A E B
        let sharp_rank = match name {
            NoteName::F => 0,
            NoteName::C => 1,
            NoteName::G => 2,
            NoteName::D => 3,
            NoteName::A => 4,
            NoteName::E => 5,
            NoteName::B => 6,
        };
        let ks = self.fifths as i32;
        if ks > 0 && sharp_rank < ks {
            Accidental::Sharp
        } else if ks < 0 && (6 - sharp_rank) < -ks {
            Accidental::Flat
        } else {
            Accidental::Natural
        }
    }

    /// Diatonic accidental of `name` in this mode.
    ///
    /// Harmonic minor raises the seventh degree, melodic minor the sixth and
    /// seventh. Blues modes report the key signature.
    pub fn accid_dia(&self, name: NoteName) -> Accidental {
        let base = self.accid_key(name);
        if self.lead(name) {
            Accidental::from_offset(base.offset() + 1).unwrap_or(base)
        } else {
            base
        }
    }

    /// Accidentals `name` takes in the scale of this mode.
    pub fn accid_scale(&self, name: NoteName) -> AccidentalSet {
        match self.mode {
            Mode::MajorBlues => self.blues_accids(name, &MAJOR_BLUES),
            Mode::MinorBlues => self.blues_accids(name, &MINOR_BLUES),
            _ => AccidentalSet::One(self.accid_dia(name)),
        }
    }

    fn blues_accids(&self, name: NoteName, degrees: &[(i32, i32)]) -> AccidentalSet {
        let tonic = self.tonic_name();
        let pc = self.tonic_pitch_class();
        degrees
            .iter()
            .filter(|(steps, _)| tonic.shift(*steps) == name)
            .filter_map(|(_, semis)| {
                Accidental::from_offset(pc_offset(pc + semis, name.natural_pitch_class()))
            })
            .fold(AccidentalSet::Empty, AccidentalSet::with)
    }

    /// Whether `name` is a raised degree of harmonic or melodic minor.
    pub fn lead(&self, name: NoteName) -> bool {
        let tonic = self.tonic_name();
        match self.mode {
            Mode::Minor => name == tonic.shift(6),
            Mode::MinorMelodic => name == tonic.shift(5) || name == tonic.shift(6),
            _ => false,
        }
    }

    /// Chromatic-harmonic scale: spelling of each semitone above the tonic.
    pub fn chromatic(&self) -> [Option<(NoteName, Accidental)>; 12] {
        let tonic = self.tonic_name();
        let pc = self.tonic_pitch_class();
        let mut scale = [None; 12];
        for (degree, steps) in CHROMATIC_STEPS.iter().enumerate() {
            let name = tonic.shift(*steps);
            let offset = pc_offset(pc + degree as i32, name.natural_pitch_class());
            scale[degree] = Accidental::from_offset(offset).map(|a| (name, a));
        }
        scale
    }

    /// Accidentals `name` takes in the chromatic-harmonic scale.
    pub fn chromatic_accids(&self, name: NoteName) -> AccidentalSet {
        self.chromatic()
            .iter()
            .flatten()
            .filter(|(n, _)| *n == name)
            .fold(AccidentalSet::Empty, |set, (_, a)| set.with(*a))
    }

    /// Spelling of pitch class `pc` in the chromatic-harmonic scale.
    pub fn chromatic_spelling(&self, pc: usize) -> Option<(NoteName, Accidental)> {
        let degree = (pc as i32 - self.tonic_pitch_class()).rem_euclid(12) as usize;
        self.chromatic()[degree]
    }

    /// Sum over letters of the semitone gap between the two diatonic scales.
    pub fn distance_diatonic(&self, other: &Tonality) -> u32 {
        NoteName::all()
            .iter()
            .map(|n| self.accid_dia(*n).distance(other.accid_dia(*n)))
            .sum()
    }

    pub fn distance_fifths(&self, other: &Tonality) -> u32 {
        (self.fifths as i32 - other.fifths as i32).unsigned_abs()
    }

    /// Steps between the two keys in Weber's regional chart.
    pub fn distance_weber(&self, other: &Tonality) -> u32 {
        weber::distance(self, other)
    }
}

impl fmt::Display for Tonality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {}",
            self.tonic_name(),
            self.tonic_accidental(),
            self.mode
        )
    }
}
