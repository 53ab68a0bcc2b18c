//! Letter names, accidentals and written octaves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diatonic letter, ordered C D E F G A B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    /// All note names in order
    pub fn all() -> [NoteName; 7] {
        [
            NoteName::C,
            NoteName::D,
            NoteName::E,
            NoteName::F,
            NoteName::G,
            NoteName::A,
            NoteName::B,
        ]
    }

    /// Position in C D E F G A B (0-6)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Letter at `index`, wrapping modulo 7.
    pub fn from_index(index: i32) -> NoteName {
        NoteName::all()[index.rem_euclid(7) as usize]
    }

    /// Pitch class of the unaltered letter (0-11)
    pub fn natural_pitch_class(self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }

    /// Letter `steps` diatonic steps above (negative: below).
    pub fn shift(self, steps: i32) -> NoteName {
        NoteName::from_index(self.index() as i32 + steps)
    }

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<NoteName> {
        match s.to_uppercase().as_str() {
            "C" => Some(NoteName::C),
            "D" => Some(NoteName::D),
            "E" => Some(NoteName::E),
            "F" => Some(NoteName::F),
            "G" => Some(NoteName::G),
            "A" => Some(NoteName::A),
            "B" => Some(NoteName::B),
            _ => None,
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NoteName::C => "C",
            NoteName::D => "D",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::G => "G",
            NoteName::A => "A",
            NoteName::B => "B",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accidental {
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    /// Semitone offset applied to the letter
    pub fn offset(self) -> i32 {
        match self {
            Accidental::DoubleFlat => -2,
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::DoubleSharp => 2,
        }
    }

    /// Accidental for a semitone offset, `None` beyond double sharp or flat.
    pub fn from_offset(offset: i32) -> Option<Accidental> {
        match offset {
            -2 => Some(Accidental::DoubleFlat),
            -1 => Some(Accidental::Flat),
            0 => Some(Accidental::Natural),
            1 => Some(Accidental::Sharp),
            2 => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }

    pub fn is_double(self) -> bool {
        matches!(self, Accidental::DoubleFlat | Accidental::DoubleSharp)
    }

    /// Sharp or double sharp.
    pub fn is_sharp(self) -> bool {
        self.offset() > 0
    }

    /// Flat or double flat.
    pub fn is_flat(self) -> bool {
        self.offset() < 0
    }

    /// Number of printed accidental signs: two for doubles, one otherwise.
    pub fn weight(self) -> u32 {
        if self.is_double() {
            2
        } else {
            1
        }
    }

    /// Semitone distance between two accidentals.
    pub fn distance(self, other: Accidental) -> u32 {
        (self.offset() - other.offset()).unsigned_abs()
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Accidental> {
        match s {
            "#" => Some(Accidental::Sharp),
            "b" => Some(Accidental::Flat),
            "##" | "x" => Some(Accidental::DoubleSharp),
            "bb" => Some(Accidental::DoubleFlat),
            "n" | "" => Some(Accidental::Natural),
            _ => None,
        }
    }
}

impl fmt::Display for Accidental {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Accidental::DoubleFlat => "bb",
            Accidental::Flat => "b",
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::DoubleSharp => "##",
        };
        f.write_str(s)
    }
}

/// Pitch class (0-11) of a MIDI key number.
pub fn pitch_class(midi: u8) -> usize {
    (midi % 12) as usize
}

/// Written octave of `midi` spelled as `name` + `accidental`, with C4 = 60.
///
/// The octave follows the letter, so B#3 and C4 share MIDI 60 and Cb4 is 59.
pub fn octave_of(midi: u8, name: NoteName, accidental: Accidental) -> i8 {
    let natural = midi as i32 - accidental.offset() - name.natural_pitch_class();
    debug_assert_eq!(natural.rem_euclid(12), 0, "{}{} does not spell {}", name, accidental, midi);
    (natural.div_euclid(12) - 1) as i8
}

/// Written pitch: letter, accidental and octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub name: NoteName,
    pub accidental: Accidental,
    pub octave: i8,
}

impl Pitch {
    pub fn new(name: NoteName, accidental: Accidental, octave: i8) -> Self {
        Self {
            name,
            accidental,
            octave,
        }
    }

    /// Spell `midi` with the given letter and accidental.
    pub fn spell(midi: u8, name: NoteName, accidental: Accidental) -> Self {
        Self::new(name, accidental, octave_of(midi, name, accidental))
    }

    /// MIDI key number of this written pitch.
    pub fn midi(&self) -> i32 {
        (self.octave as i32 + 1) * 12 + self.name.natural_pitch_class() + self.accidental.offset()
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, self.accidental, self.octave)
    }
}
