use std::fmt;

use spellconf::TieBreakMode;

use super::{AccidCost, Cost, CostStep};
use crate::pitch::{Accidental, NoteName};

/// Secondary counters, incremented only for printed accidentals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TieBreaks {
    /// Accidental outside the chromatic-harmonic scale of the global tonality.
    pub chromharm: u32,
    /// Flat in a sharp key, or sharp in a flat key, outside the scale.
    pub color: u32,
    /// Cb, B#, E# or Fb outside the scale.
    pub cflat: u32,
    /// Double accidental outside the scale.
    pub double: u32,
}

impl TieBreaks {
    pub fn update(&mut self, step: &CostStep<'_>) -> bool {
        if !step.print {
            return false;
        }
        let (name, acc) = (step.name, step.accidental);
        let ks = step.global.fifths();
        let off_scale = !step.global.accid_scale(name).contains(acc);
        let mut changed = false;

        if !step.global.chromatic_accids(name).contains(acc) {
            self.chromharm += 1;
            changed = true;
        }
        if off_scale && ((ks >= 0 && acc.is_flat()) || (ks <= 0 && acc.is_sharp())) {
            self.color += 1;
            changed = true;
        }
        if off_scale
            && matches!(
                (name, acc),
                (NoteName::C, Accidental::Flat)
                    | (NoteName::B, Accidental::Sharp)
                    | (NoteName::F, Accidental::Flat)
                    | (NoteName::E, Accidental::Sharp)
            )
        {
            self.cflat += 1;
            changed = true;
        }
        if off_scale && acc.is_double() {
            self.double += 1;
            changed = true;
        }
        changed
    }

    pub fn add(&mut self, other: &TieBreaks) {
        self.chromharm += other.chromharm;
        self.color += other.color;
        self.cflat += other.cflat;
        self.double += other.double;
    }

    fn key(&self, mode: TieBreakMode) -> [u32; 4] {
        match mode {
            TieBreakMode::Lex => [self.color, self.cflat, self.double, self.chromharm],
            TieBreakMode::Sum => [
                self.color + self.cflat + self.double,
                self.chromharm,
                self.color,
                0,
            ],
        }
    }

    pub fn less(&self, other: &TieBreaks, mode: TieBreakMode) -> bool {
        self.key(mode) < other.key(mode)
    }

    pub fn equal(&self, other: &TieBreaks, mode: TieBreakMode) -> bool {
        self.key(mode) == other.key(mode)
    }
}

impl fmt::Display for TieBreaks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.chromharm, self.color, self.cflat, self.double
        )
    }
}

/// Printed accidentals, with tie-break counters deciding between equal counts.
#[derive(Debug, Clone, Copy)]
pub struct TieBreakCost {
    base: AccidCost,
    ties: TieBreaks,
    mode: TieBreakMode,
}

impl TieBreakCost {
    pub fn new(lead_discount: bool, mode: TieBreakMode) -> Self {
        Self {
            base: AccidCost::new(lead_discount),
            ties: TieBreaks::default(),
            mode,
        }
    }

    pub fn ties(&self) -> &TieBreaks {
        &self.ties
    }
}

impl PartialEq for TieBreakCost {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.ties.equal(&other.ties, self.mode)
    }
}

impl Cost for TieBreakCost {
    fn zero(&self) -> Self {
        Self::new(self.base.lead_discount(), self.mode)
    }

    fn less(&self, other: &Self) -> bool {
        if self.base == other.base {
            self.ties.less(&other.ties, self.mode)
        } else {
            self.base.less(&other.base)
        }
    }

    fn add(&mut self, other: &Self) {
        self.base.add(&other.base);
        self.ties.add(&other.ties);
    }

    fn update(&mut self, step: &CostStep<'_>) -> bool {
        let a = self.base.update(step);
        let t = self.ties.update(step);
        a || t
    }

    fn accidentals(&self) -> u32 {
        self.base.accid()
    }

    /// Gap on the accidental count only.
    fn dist(&self, other: &Self) -> f64 {
        self.base.dist(&other.base)
    }
}

impl fmt::Display for TieBreakCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.base, self.ties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AccidentalState, StateScope};
    use crate::tonality::Tonality;

    fn printed<'a>(
        name: NoteName,
        accidental: Accidental,
        state: &'a AccidentalState,
        ton: &'a Tonality,
    ) -> CostStep<'a> {
        CostStep {
            name,
            accidental,
            print: true,
            state,
            global: ton,
            local: None,
        }
    }

    fn signature(ton: &Tonality) -> AccidentalState {
        AccidentalState::from_tonality(ton, true, StateScope::Letter)
    }

    #[test]
    fn test_counters_in_c_major() {
        let c = Tonality::major(0).unwrap();
        let st = signature(&c);
        let mut ties = TieBreaks::default();

        // Db is in the chromatic-harmonic scale of C, but a flat in a sharp-side key
        ties.update(&printed(NoteName::D, Accidental::Flat, &st, &c));
        assert_eq!(ties, TieBreaks { chromharm: 0, color: 1, cflat: 0, double: 0 });

        // C# is not in the chromatic-harmonic scale
        ties.update(&printed(NoteName::C, Accidental::Sharp, &st, &c));
        assert_eq!(ties.chromharm, 1);
        assert_eq!(ties.color, 2);

        ties.update(&printed(NoteName::F, Accidental::Flat, &st, &c));
        assert_eq!(ties.cflat, 1);

        ties.update(&printed(NoteName::E, Accidental::DoubleFlat, &st, &c));
        assert_eq!(ties.double, 1);
    }

    #[test]
    fn test_in_scale_notes_are_free() {
        let d = Tonality::major(2).unwrap();
        let st = signature(&d);
        let mut ties = TieBreaks::default();
        assert!(!ties.update(&printed(NoteName::F, Accidental::Sharp, &st, &d)));
        assert_eq!(ties, TieBreaks::default());
    }

    #[test]
    fn test_equal_accidentals_decided_by_ties() {
        let c = Tonality::major(0).unwrap();
        let st = signature(&c);
        let seed = TieBreakCost::new(false, TieBreakMode::Lex);

        // F# vs Gb: one accidental each, Gb is off-color in C major
        let mut sharp = seed.zero();
        sharp.update(&printed(NoteName::F, Accidental::Sharp, &st, &c));
        let mut flat = seed.zero();
        flat.update(&printed(NoteName::G, Accidental::Flat, &st, &c));

        assert_eq!(sharp.accidentals(), flat.accidentals());
        assert!(sharp.less(&flat));
        assert!(!flat.less(&sharp));
        assert_ne!(sharp, flat);
    }

    #[test]
    fn test_sum_mode_order() {
        let a = TieBreaks { chromharm: 0, color: 2, cflat: 0, double: 0 };
        let b = TieBreaks { chromharm: 1, color: 0, cflat: 1, double: 0 };
        // lexicographic: color decides
        assert!(b.less(&a, TieBreakMode::Lex));
        // summed: 2 vs 1 minor counters
        assert!(b.less(&a, TieBreakMode::Sum));

        let c = TieBreaks { chromharm: 0, color: 0, cflat: 1, double: 0 };
        assert!(c.less(&b, TieBreakMode::Sum));
        assert!(!c.equal(&a, TieBreakMode::Sum));
    }
}
