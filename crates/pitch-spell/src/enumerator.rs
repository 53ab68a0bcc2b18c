//! Note sequences consumed and renamed by the speller.

use serde::{Deserialize, Serialize};

use crate::pitch::{Accidental, NoteName, Pitch};

/// Spelling chosen for one note of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpelledNote {
    /// Position in the enumerator.
    pub index: usize,
    pub midi: u8,
    pub pitch: Pitch,
    /// The accidental must be printed.
    pub print: bool,
}

impl SpelledNote {
    pub fn name(&self) -> NoteName {
        self.pitch.name
    }

    pub fn accidental(&self) -> Accidental {
        self.pitch.accidental
    }

    pub fn octave(&self) -> i8 {
        self.pitch.octave
    }
}

/// Indexed access to the notes of a piece.
///
/// Notes are ordered by onset; bar numbers never decrease along the sequence.
/// The speller reads notes during the search and calls [`rename`] once per
/// note when the spelling is committed.
///
/// [`rename`]: NoteEnumerator::rename
pub trait NoteEnumerator {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn midi(&self, i: usize) -> u8;

    /// Bar number of note `i`.
    fn bar(&self, i: usize) -> usize;

    /// Note `i` sounds together with note `i + 1`.
    fn simultaneous(&self, i: usize) -> bool;

    fn rename(&mut self, i: usize, pitch: Pitch, print: bool);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Note {
    midi: u8,
    bar: usize,
    simultaneous: bool,
    spelling: Option<(Pitch, bool)>,
}

/// In-memory note sequence.
///
/// ```ignore
/// let mut notes = NoteSequence::new();
/// notes.push_bar(&[60, 62]);
/// notes.push_chord(1, &[48, 55, 64]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSequence {
    notes: Vec<Note>,
}

impl NoteSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// One bar per slice, single notes only.
    pub fn from_bars(bars: &[&[u8]]) -> Self {
        let mut seq = Self::new();
        for (bar, notes) in bars.iter().enumerate() {
            for midi in notes.iter() {
                seq.push(bar, *midi);
            }
        }
        seq
    }

    fn last_bar(&self) -> Option<usize> {
        self.notes.last().map(|n| n.bar)
    }

    pub fn push(&mut self, bar: usize, midi: u8) {
        debug_assert!(midi <= 127, "MIDI key {} out of range", midi);
        debug_assert!(self.last_bar().map_or(true, |b| b <= bar), "bar {} out of order", bar);
        self.notes.push(Note {
            midi,
            bar,
            simultaneous: false,
            spelling: None,
        });
    }

    /// Append notes sounding together in `bar`.
    pub fn push_chord(&mut self, bar: usize, midis: &[u8]) {
        for (k, midi) in midis.iter().enumerate() {
            self.push(bar, *midi);
            if k + 1 < midis.len() {
                if let Some(note) = self.notes.last_mut() {
                    note.simultaneous = true;
                }
            }
        }
    }

    /// Append single notes as a new bar, numbered after the last one.
    pub fn push_bar(&mut self, midis: &[u8]) {
        let bar = self.last_bar().map_or(0, |b| b + 1);
        for midi in midis {
            self.push(bar, *midi);
        }
    }

    pub fn spelling(&self, i: usize) -> Option<SpelledNote> {
        let note = self.notes.get(i)?;
        let (pitch, print) = note.spelling?;
        Some(SpelledNote {
            index: i,
            midi: note.midi,
            pitch,
            print,
        })
    }

    /// Spellings of all renamed notes, in order.
    pub fn spelled(&self) -> impl Iterator<Item = SpelledNote> + '_ {
        (0..self.notes.len()).filter_map(move |i| self.spelling(i))
    }

    /// Number of printed accidental signs in the committed spelling.
    pub fn printed_accidentals(&self) -> u32 {
        self.spelled()
            .filter(|n| n.print)
            .map(|n| n.accidental().weight())
            .sum()
    }

    pub fn clear_spelling(&mut self) {
        for note in &mut self.notes {
            note.spelling = None;
        }
    }
}

impl NoteEnumerator for NoteSequence {
    fn len(&self) -> usize {
        self.notes.len()
    }

    fn midi(&self, i: usize) -> u8 {
        self.notes[i].midi
    }

    fn bar(&self, i: usize) -> usize {
        self.notes[i].bar
    }

    fn simultaneous(&self, i: usize) -> bool {
        self.notes[i].simultaneous
    }

    fn rename(&mut self, i: usize, pitch: Pitch, print: bool) {
        debug_assert_eq!(pitch.midi(), self.notes[i].midi as i32, "{} does not spell note {}", pitch, i);
        self.notes[i].spelling = Some((pitch, print));
    }
}
