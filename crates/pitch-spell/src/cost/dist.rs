use std::fmt;

use spellconf::TieBreakMode;

use super::{relative_gap, AccidCost, Cost, CostStep, TieBreaks};

/// Letters of the accidental state, after the note, that depart from the
/// scale of the local tonality. With `lead_discount`, the leading-tone
/// letters of the local tonality are not counted.
fn local_distance(step: &CostStep<'_>, lead_discount: bool) -> u32 {
    match step.local {
        None => 0,
        Some(local) if lead_discount => step.state.distance_to_except_leads(local),
        Some(local) => step.state.distance_to(local),
    }
}

/// Accidentals first, then distance to the local tonality, then tie-breaks.
///
/// The distance grows on every note by the number of letters the current
/// accidental state spells differently from the local tonality, so a
/// departure keeps costing until it is cancelled.
#[derive(Debug, Clone, Copy)]
pub struct DistCost {
    base: AccidCost,
    dist: u32,
    ties: TieBreaks,
    mode: TieBreakMode,
}

impl DistCost {
    pub fn new(lead_discount: bool, mode: TieBreakMode) -> Self {
        Self {
            base: AccidCost::new(lead_discount),
            dist: 0,
            ties: TieBreaks::default(),
            mode,
        }
    }

    pub fn distance(&self) -> u32 {
        self.dist
    }
}

impl PartialEq for DistCost {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.dist == other.dist
            && self.ties.equal(&other.ties, self.mode)
    }
}

impl Cost for DistCost {
    fn zero(&self) -> Self {
        Self::new(self.base.lead_discount(), self.mode)
    }

    fn less(&self, other: &Self) -> bool {
        if self.base != other.base {
            self.base.less(&other.base)
        } else if self.dist != other.dist {
            self.dist < other.dist
        } else {
            self.ties.less(&other.ties, self.mode)
        }
    }

    fn add(&mut self, other: &Self) {
        self.base.add(&other.base);
        self.dist += other.dist;
        self.ties.add(&other.ties);
    }

    fn update(&mut self, step: &CostStep<'_>) -> bool {
        let mut changed = self.base.update(step);
        let d = local_distance(step, self.base.lead_discount());
        if d > 0 {
            self.dist += d;
            changed = true;
        }
        self.ties.update(step) || changed
    }

    fn accidentals(&self) -> u32 {
        self.base.accid()
    }

    fn dist(&self, other: &Self) -> f64 {
        if self.base != other.base {
            self.base.dist(&other.base)
        } else {
            relative_gap(self.dist as f64, other.dist as f64)
        }
    }
}

impl fmt::Display for DistCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.base, self.dist, self.ties)
    }
}

/// Accidentals and local distance summed into one primary counter.
///
/// Ties on the sum are decided by chromatic-harmonic mismatches, then by
/// color and rare-spelling counts together.
#[derive(Debug, Clone, Copy)]
pub struct DistPlusCost {
    base: AccidCost,
    dist: u32,
    ties: TieBreaks,
}

impl DistPlusCost {
    pub fn new(lead_discount: bool) -> Self {
        Self {
            base: AccidCost::new(lead_discount),
            dist: 0,
            ties: TieBreaks::default(),
        }
    }

    pub fn distance(&self) -> u32 {
        self.dist
    }

    fn key(&self) -> [u32; 3] {
        [
            self.base.accid() + self.dist,
            self.ties.chromharm,
            self.ties.color + self.ties.cflat,
        ]
    }
}

impl PartialEq for DistPlusCost {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Cost for DistPlusCost {
    fn zero(&self) -> Self {
        Self::new(self.base.lead_discount())
    }

    fn less(&self, other: &Self) -> bool {
        self.key() < other.key()
    }

    fn add(&mut self, other: &Self) {
        self.base.add(&other.base);
        self.dist += other.dist;
        self.ties.add(&other.ties);
    }

    fn update(&mut self, step: &CostStep<'_>) -> bool {
        let mut changed = self.base.update(step);
        let d = local_distance(step, self.base.lead_discount());
        if d > 0 {
            self.dist += d;
            changed = true;
        }
        self.ties.update(step) || changed
    }

    fn accidentals(&self) -> u32 {
        self.base.accid()
    }

    fn dist(&self, other: &Self) -> f64 {
        let (a, b) = (self.key(), other.key());
        let field = (0..3).find(|&i| a[i] != b[i]).unwrap_or(0);
        relative_gap(a[field] as f64, b[field] as f64)
    }
}

impl fmt::Display for DistPlusCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}:{}", self.base, self.dist, self.ties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::{Accidental, NoteName};
    use crate::state::{AccidentalState, StateScope};
    use crate::tonality::Tonality;

    /// Write `name` into `state` the way the search does, then cost it.
    fn play<C: Cost>(
        cost: &mut C,
        state: &mut AccidentalState,
        name: NoteName,
        accidental: Accidental,
        global: &Tonality,
        local: Option<&Tonality>,
    ) -> bool {
        let print = state.update(accidental, name, 4);
        cost.update(&CostStep {
            name,
            accidental,
            print,
            state: &*state,
            global,
            local,
        })
    }

    #[test]
    fn test_departure_costs_on_every_note() {
        let c = Tonality::major(0).unwrap();
        let g = Tonality::major(1).unwrap();
        let mut state = AccidentalState::from_tonality(&c, true, StateScope::Letter);
        let mut cost = DistCost::new(false, TieBreakMode::Lex);

        // F natural: no sign, but the state still has no F#
        assert!(play(&mut cost, &mut state, NoteName::F, Accidental::Natural, &c, Some(&g)));
        assert_eq!(cost.accidentals(), 0);
        assert_eq!(cost.distance(), 1);

        // G natural is diatonic in G major, the F is still off
        play(&mut cost, &mut state, NoteName::G, Accidental::Natural, &c, Some(&g));
        assert_eq!(cost.distance(), 2);

        // F# brings the state in line with G major
        play(&mut cost, &mut state, NoteName::F, Accidental::Sharp, &c, Some(&g));
        play(&mut cost, &mut state, NoteName::A, Accidental::Natural, &c, Some(&g));
        assert_eq!(cost.accidentals(), 1);
        assert_eq!(cost.distance(), 2);
    }

    #[test]
    fn test_no_local_no_distance() {
        let c = Tonality::major(0).unwrap();
        let mut state = AccidentalState::from_tonality(&c, true, StateScope::Letter);
        let mut first_pass = DistCost::new(false, TieBreakMode::Lex);
        assert!(!play(&mut first_pass, &mut state, NoteName::F, Accidental::Natural, &c, None));
        assert_eq!(first_pass.distance(), 0);
    }

    #[test]
    fn test_lead_discount_on_distance() {
        let c = Tonality::major(0).unwrap();
        let a_minor = Tonality::minor(0).unwrap();

        // a C major signature lacks the G# of A harmonic minor
        let mut state = AccidentalState::from_tonality(&c, true, StateScope::Letter);
        let mut plain = DistCost::new(false, TieBreakMode::Lex);
        play(&mut plain, &mut state, NoteName::A, Accidental::Natural, &c, Some(&a_minor));
        assert_eq!(plain.distance(), 1);

        let mut state = AccidentalState::from_tonality(&c, true, StateScope::Letter);
        let mut discounted = DistCost::new(true, TieBreakMode::Lex);
        play(&mut discounted, &mut state, NoteName::A, Accidental::Natural, &c, Some(&a_minor));
        assert_eq!(discounted.distance(), 0);

        // the raised leading tone is neither a departure nor charged
        play(&mut discounted, &mut state, NoteName::G, Accidental::Sharp, &c, Some(&a_minor));
        assert_eq!(discounted.accidentals(), 0);
        assert_eq!(discounted.distance(), 0);
    }

    #[test]
    fn test_accidentals_dominate_distance() {
        let c = Tonality::major(0).unwrap();
        let d = Tonality::major(2).unwrap();
        let seed = DistCost::new(false, TieBreakMode::Lex);

        // two naturals under D major: F and C both off on each note
        let mut state = AccidentalState::from_tonality(&c, true, StateScope::Letter);
        let mut far = seed.zero();
        play(&mut far, &mut state, NoteName::F, Accidental::Natural, &c, Some(&d));
        play(&mut far, &mut state, NoteName::E, Accidental::Natural, &c, Some(&d));

        let mut state = AccidentalState::from_tonality(&c, true, StateScope::Letter);
        let mut printed = seed.zero();
        play(&mut printed, &mut state, NoteName::F, Accidental::Sharp, &c, Some(&d));

        assert_eq!(far.distance(), 4);
        assert_eq!(printed.distance(), 1);
        assert!(far.less(&printed));
        // the gap is read on the accidental count
        assert!(far.dist(&printed).is_infinite());
    }

    #[test]
    fn test_dist_plus_sums() {
        let c = Tonality::major(0).unwrap();
        let g = Tonality::major(1).unwrap();
        let seed = DistPlusCost::new(false);

        let mut state = AccidentalState::from_tonality(&c, true, StateScope::Letter);
        let mut far = seed.zero();
        play(&mut far, &mut state, NoteName::F, Accidental::Natural, &c, Some(&g));
        play(&mut far, &mut state, NoteName::F, Accidental::Natural, &c, Some(&g));

        let mut state = AccidentalState::from_tonality(&c, true, StateScope::Letter);
        let mut printed = seed.zero();
        play(&mut printed, &mut state, NoteName::F, Accidental::Sharp, &c, Some(&g));

        // 0 + 2 against 1 + 0
        assert!(printed.less(&far));
        assert_eq!(printed.to_string(), "1+0:0:1:0:0");
        assert_eq!(far.dist(&printed), 100.0);
    }
}
