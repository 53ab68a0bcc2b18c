//! Entry point: configure, spell, report.

use std::path::Path;

use serde::{Deserialize, Serialize};
use spellconf::{CostKind, SpellConfig};
use tracing::info;

use crate::cost::{AccidCost, Cost, DistCost, DistPlusCost, TieBreakCost};
use crate::diagnostics::Diagnostics;
use crate::enumerator::NoteEnumerator;
use crate::search::SearchOptions;
use crate::table::SpellTable;
use crate::ton_index::TonalityIndex;
use crate::tonality::Tonality;
use crate::{Result, SpellError};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellReport {
    pub global: Tonality,
    /// Row of `global` in the tonality index.
    pub global_index: usize,
    /// Global tonalities tied after the first pass, its favourite first.
    pub candidates: Vec<Tonality>,
    /// Local tonality of each bar.
    pub locals: Vec<Tonality>,
    /// Printed accidentals in the committed spelling.
    pub accidentals: u32,
    /// Summed cost of the committed spelling, as displayed by the cost model.
    pub cost: String,
    pub diagnostics: Diagnostics,
}

impl SpellReport {
    pub fn tie_break_failures(&self) -> usize {
        self.diagnostics.tie_break_failures()
    }
}

/// Pitch speller over a list of candidate tonalities.
///
/// ```ignore
/// let mut speller = Speller::new(SpellConfig::default());
/// let report = speller.spell(&mut notes)?;
/// ```
#[derive(Debug, Clone)]
pub struct Speller {
    index: TonalityIndex,
    config: SpellConfig,
    global: Option<Tonality>,
}

impl Speller {
    /// Speller over the tonality preset named in `config`.
    pub fn new(config: SpellConfig) -> Self {
        let index = TonalityIndex::from_preset(config.tonalities.preset);
        Self::with_index(config, index)
    }

    pub fn with_index(config: SpellConfig, index: TonalityIndex) -> Self {
        Self {
            index,
            config,
            global: None,
        }
    }

    /// Speller configured from the config files and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Ok(Self::new(SpellConfig::load_from(config_path)?))
    }

    pub fn config(&self) -> &SpellConfig {
        &self.config
    }

    pub fn index(&self) -> &TonalityIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut TonalityIndex {
        &mut self.index
    }

    /// Append a candidate tonality; fails once the index is closed.
    pub fn add_tonality(&mut self, ton: Tonality, global: bool) -> Result<()> {
        self.index.add(ton, global)
    }

    /// Spell under `ton` instead of estimating the global tonality. `ton`
    /// must be in the index when [`spell`](Self::spell) runs.
    pub fn set_global(&mut self, ton: Tonality) {
        self.global = Some(ton);
    }

    pub fn clear_global(&mut self) {
        self.global = None;
    }

    /// Spell `notes` and commit the result through [`NoteEnumerator::rename`].
    ///
    /// Closes the tonality index. An empty index is replaced by the 30
    /// major and harmonic minor keys.
    pub fn spell<E: NoteEnumerator + ?Sized>(&mut self, notes: &mut E) -> Result<SpellReport> {
        let mut diagnostics = Diagnostics::new(self.config.diagnostics.tie_break_warnings);
        if self.index.is_empty() {
            diagnostics.warning("tonality index is empty, using the 30 default tonalities", None);
            self.index = TonalityIndex::default30();
        }
        self.index.close();

        let search = &self.config.search;
        let lead = search.lead_discount;
        let mode = search.tie_break;
        info!(
            notes = notes.len(),
            tonalities = self.index.len(),
            cost = %search.cost,
            "spelling"
        );
        match search.cost {
            CostKind::Accid => self.run(notes, AccidCost::new(lead), diagnostics),
            CostKind::AccidTieBreak => self.run(notes, TieBreakCost::new(lead, mode), diagnostics),
            CostKind::AccidDist => self.run(notes, DistCost::new(lead, mode), diagnostics),
            CostKind::AccidDistPlus => self.run(notes, DistPlusCost::new(lead), diagnostics),
        }
    }

    fn run<C: Cost, E: NoteEnumerator + ?Sized>(
        &self,
        notes: &mut E,
        seed: C,
        diagnostics: Diagnostics,
    ) -> Result<SpellReport> {
        let mut table = SpellTable::new(
            &*notes,
            self.index.clone(),
            seed,
            SearchOptions::from_config(&self.config.search),
            self.config.tonalities.local_distance,
            diagnostics,
        )?;
        table.set_global_tolerance(self.config.tonalities.global_tolerance);
        if let Some(ton) = self.global {
            let row = self.index.find(&ton).ok_or(SpellError::NotInIndex(ton))?;
            table.set_global(row)?;
        }
        let global = table.estimate(&*notes)?;
        table.rename(notes)?;

        let index = table.index();
        let cost = table.second_pass_cost(global);
        let report = SpellReport {
            global: *index.ton(global),
            global_index: global,
            candidates: table.candidates().iter().map(|&i| *index.ton(i)).collect(),
            locals: table.locals().into_iter().map(|i| *index.ton(i)).collect(),
            accidentals: cost.accidentals(),
            cost: cost.to_string(),
            diagnostics: table.diagnostics().clone(),
        };
        info!(
            global = %report.global,
            accidentals = report.accidentals,
            tie_break_failures = report.tie_break_failures(),
            "spelled"
        );
        Ok(report)
    }
}
