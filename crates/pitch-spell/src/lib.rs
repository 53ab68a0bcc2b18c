//! Pitch spelling for MIDI note sequences.
//!
//! Given notes as MIDI pitches grouped into bars and chords, choose a letter,
//! accidental, octave and print flag for every note. For each candidate
//! tonality and bar a uniform-cost search finds the cheapest spellings; a
//! two-pass table then estimates the global tonality of the piece and a local
//! tonality per bar, and commits the best spelling back to the caller.
//!
//! ```ignore
//! let mut notes = NoteSequence::new();
//! notes.push_bar(&[60, 61, 63]);
//! let report = Speller::new(SpellConfig::default()).spell(&mut notes)?;
//! println!("{}", report.global);
//! ```

pub mod accidentals;
pub mod cost;
pub mod diagnostics;
pub mod enharmonic;
pub mod enumerator;
pub mod extract;
pub mod grid;
pub mod node;
pub mod pitch;
pub mod search;
pub mod speller;
pub mod state;
pub mod table;
pub mod ton_index;
pub mod tonality;
pub mod transition;
pub mod vector;
pub mod weber;

pub use accidentals::AccidentalSet;
pub use cost::{AccidCost, Cost, CostStep, DistCost, DistPlusCost, TieBreakCost, TieBreaks};
pub use diagnostics::{Diagnostic, DiagnosticLevel, Diagnostics};
pub use enharmonic::EnharmonicTable;
pub use enumerator::{NoteEnumerator, NoteSequence, SpelledNote};
pub use extract::PathExtractor;
pub use node::{NodeKind, PathNode};
pub use pitch::{Accidental, NoteName, Pitch};
pub use search::PathSearch;
pub use speller::{SpellReport, Speller};
pub use state::{AccidentalState, StateScope};
pub use table::SpellTable;
pub use ton_index::TonalityIndex;
pub use tonality::{Mode, Tonality};
pub use transition::TransitionGenerator;
pub use vector::SpellVector;

pub use spellconf::SpellConfig;

/// Errors from spelling operations.
#[derive(Debug, thiserror::Error)]
pub enum SpellError {
    #[error("no notes to spell")]
    NoNotes,

    #[error("tonality index has no global tonality")]
    NoTonality,

    #[error("tonality index is closed")]
    IndexClosed,

    #[error("global tonality could not be determined")]
    GlobalUndetermined,

    #[error("local tonality of bar {bar} could not be determined")]
    LocalUndetermined { bar: usize },

    #[error("no spelling found for bars {bars:?}")]
    Unspelled { bars: Vec<usize> },

    #[error("no tonality at row {0} of the index")]
    NoSuchRow(usize),

    #[error("tonality {0} is not in the index")]
    NotInIndex(Tonality),

    #[error("invalid tonality: {fifths} fifths, {mode}")]
    InvalidTonality { fifths: i8, mode: String },

    #[error(transparent)]
    Config(#[from] spellconf::ConfigError),
}

pub type Result<T> = std::result::Result<T, SpellError>;
