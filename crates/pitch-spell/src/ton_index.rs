//! Ordered, closable list of candidate tonalities.

use serde::{Deserialize, Serialize};
use spellconf::TonalityPreset;
use tracing::trace;

use crate::tonality::{Mode, Tonality};
use crate::{Result, SpellError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Entry {
    ton: Tonality,
    /// May be chosen as the global tonality of a piece.
    global: bool,
}

/// Row headers of a spelling table.
///
/// Tonalities are added in order, then the index is closed; a closed index
/// refuses further additions. Every tonality can serve as a local
/// tonality, only those flagged `global` are considered for the piece.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TonalityIndex {
    entries: Vec<Entry>,
    closed: bool,
}

impl TonalityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index filled from a preset, still open for additions.
    pub fn from_preset(preset: TonalityPreset) -> Self {
        let mut index = Self::new();
        match preset {
            TonalityPreset::Empty => {}
            TonalityPreset::Default25 => {
                index.push_range(-4..=7, Mode::Major);
                index.push_range(-6..=6, Mode::Minor);
            }
            TonalityPreset::Default26 => {
                index.push_range(-6..=6, Mode::Major);
                index.push_range(-6..=6, Mode::Minor);
            }
            TonalityPreset::Default30 => {
                index.push_range(-7..=7, Mode::Major);
                index.push_range(-7..=7, Mode::Minor);
            }
        }
        index
    }

    /// The 15 major and 15 harmonic minor keys, closed.
    pub fn default30() -> Self {
        let mut index = Self::from_preset(TonalityPreset::Default30);
        index.close();
        index
    }

    fn push_range(&mut self, range: std::ops::RangeInclusive<i8>, mode: Mode) {
        for ks in range {
            self.entries.push(Entry {
                ton: Tonality::new_unchecked(ks, mode),
                global: true,
            });
        }
    }

    /// Append a tonality. Fails once the index is closed.
    pub fn add(&mut self, ton: Tonality, global: bool) -> Result<()> {
        if self.closed {
            return Err(SpellError::IndexClosed);
        }
        trace!(%ton, global, "tonality index add");
        self.entries.push(Entry { ton, global });
        Ok(())
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Tonality> {
        self.entries.get(i).map(|e| &e.ton)
    }

    pub(crate) fn ton(&self, i: usize) -> &Tonality {
        &self.entries[i].ton
    }

    pub fn is_global(&self, i: usize) -> bool {
        self.entries.get(i).is_some_and(|e| e.global)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tonality> {
        self.entries.iter().map(|e| &e.ton)
    }

    /// Position of `ton` in the index, if present.
    pub fn find(&self, ton: &Tonality) -> Option<usize> {
        self.entries.iter().position(|e| e.ton == *ton)
    }
}
