//! Local tonality of every bar, for each global candidate.

use serde::{Deserialize, Serialize};
use spellconf::LocalDistance;
use tracing::debug;

use crate::cost::Cost;
use crate::diagnostics::Diagnostics;
use crate::ton_index::TonalityIndex;
use crate::vector::SpellVector;
use crate::{Result, SpellError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRow {
    /// Row of the assumed global tonality.
    pub global: usize,
    /// Row of the local tonality, one per bar.
    pub locals: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalGrid {
    rows: Vec<GridRow>,
}

impl LocalGrid {
    /// Estimate the locals of every bar, in order, for each global candidate.
    ///
    /// The first bar starts from the global tonality itself, every later bar
    /// from the local of the bar before.
    pub fn build<C: Cost>(
        vectors: &[SpellVector<C>],
        index: &TonalityIndex,
        candidates: &[usize],
        distance: LocalDistance,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let mut grid = LocalGrid::default();
        for &global in candidates {
            let mut prev = global;
            let mut locals = Vec::with_capacity(vectors.len());
            for vector in vectors {
                let est = vector
                    .estimate_local(index, global, prev, distance)
                    .ok_or(SpellError::LocalUndetermined { bar: vector.bar() })?;
                if est.ambiguous {
                    diagnostics.tie_break_failure(
                        format!(
                            "local tonality tied under {}, keeping {}",
                            index.ton(global),
                            index.ton(est.index)
                        ),
                        Some(vector.bar()),
                    );
                }
                locals.push(est.index);
                prev = est.index;
            }
            debug!(global = %index.ton(global), ?locals, "local tonalities estimated");
            grid.rows.push(GridRow { global, locals });
        }
        Ok(grid)
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Locals per bar under global row `global`.
    pub fn locals(&self, global: usize) -> Option<&[usize]> {
        self.rows
            .iter()
            .find(|r| r.global == global)
            .map(|r| r.locals.as_slice())
    }

    pub fn local(&self, global: usize, bar: usize) -> Option<usize> {
        self.locals(global).and_then(|l| l.get(bar).copied())
    }
}
