use std::fmt;

use super::{relative_gap, Cost, CostStep};
use crate::pitch::{Accidental, NoteName};
use crate::tonality::Tonality;

/// `name` is a raised leading tone of `ton`, written with its scale accidental.
pub(crate) fn is_lead(ton: &Tonality, name: NoteName, accidental: Accidental) -> bool {
    ton.lead(name) && ton.accid_dia(name) == accidental
}

/// Number of printed accidental signs.
///
/// A double accidental counts two, any other printed accidental one. With
/// `lead_discount`, the raised leading tone of a minor global or local
/// tonality is not charged when written with its scale accidental.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccidCost {
    accid: u32,
    lead_discount: bool,
}

impl AccidCost {
    pub fn new(lead_discount: bool) -> Self {
        Self {
            accid: 0,
            lead_discount,
        }
    }

    pub fn accid(&self) -> u32 {
        self.accid
    }

    pub fn lead_discount(&self) -> bool {
        self.lead_discount
    }

    fn discounted(&self, step: &CostStep<'_>) -> bool {
        self.lead_discount
            && (is_lead(step.global, step.name, step.accidental)
                || step
                    .local
                    .is_some_and(|local| is_lead(local, step.name, step.accidental)))
    }
}

impl PartialEq for AccidCost {
    fn eq(&self, other: &Self) -> bool {
        self.accid == other.accid
    }
}

impl Cost for AccidCost {
    fn zero(&self) -> Self {
        Self::new(self.lead_discount)
    }

    fn less(&self, other: &Self) -> bool {
        self.accid < other.accid
    }

    fn add(&mut self, other: &Self) {
        self.accid += other.accid;
    }

    fn update(&mut self, step: &CostStep<'_>) -> bool {
        if !step.print || self.discounted(step) {
            return false;
        }
        self.accid += step.accidental.weight();
        true
    }

    fn accidentals(&self) -> u32 {
        self.accid
    }

    fn dist(&self, other: &Self) -> f64 {
        relative_gap(self.accid as f64, other.accid as f64)
    }
}

impl fmt::Display for AccidCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.accid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AccidentalState, StateScope};
    use std::sync::OnceLock;

    fn blank() -> &'static AccidentalState {
        static STATE: OnceLock<AccidentalState> = OnceLock::new();
        STATE.get_or_init(|| {
            AccidentalState::from_tonality(&Tonality::major(0).unwrap(), true, StateScope::Letter)
        })
    }

    fn printed<'a>(name: NoteName, accidental: Accidental, ton: &'a Tonality) -> CostStep<'a> {
        CostStep {
            name,
            accidental,
            print: true,
            state: blank(),
            global: ton,
            local: None,
        }
    }

    #[test]
    fn test_counts_printed_accidentals() {
        let c = Tonality::major(0).unwrap();
        let zero = AccidCost::new(false);

        let mut c1 = zero.zero();
        assert!(c1.update(&printed(NoteName::F, Accidental::Sharp, &c)));
        assert_eq!(c1.accid(), 1);

        let mut c2 = zero.zero();
        assert!(c2.update(&printed(NoteName::B, Accidental::DoubleFlat, &c)));
        assert_eq!(c2.accid(), 2);

        let mut sum = c1;
        sum.add(&c1);
        assert_eq!(sum, c2);

        assert!(zero.less(&c1));
        assert!(c1.less(&c2));
        assert!(!c2.less(&c1));
    }

    #[test]
    fn test_unprinted_is_free() {
        let c = Tonality::major(0).unwrap();
        let mut cost = AccidCost::new(false);
        let step = CostStep {
            print: false,
            ..printed(NoteName::F, Accidental::Sharp, &c)
        };
        assert!(!cost.update(&step));
        assert_eq!(cost.accid(), 0);
    }

    #[test]
    fn test_lead_discount() {
        let a_minor = Tonality::minor(0).unwrap();
        let step = printed(NoteName::G, Accidental::Sharp, &a_minor);

        let mut plain = AccidCost::new(false);
        assert!(plain.update(&step));
        assert_eq!(plain.accid(), 1);

        let mut discounted = AccidCost::new(true);
        assert!(!discounted.update(&step));
        assert_eq!(discounted.accid(), 0);

        // only the raised spelling is discounted
        assert!(discounted.update(&printed(NoteName::G, Accidental::Natural, &a_minor)));
        assert_eq!(discounted.accid(), 1);
    }

    #[test]
    fn test_lead_discount_follows_the_local_tonality() {
        let c = Tonality::major(0).unwrap();
        let a_minor = Tonality::minor(0).unwrap();
        let step = CostStep {
            local: Some(&a_minor),
            ..printed(NoteName::G, Accidental::Sharp, &c)
        };

        let mut plain = AccidCost::new(false);
        assert!(plain.update(&step));

        // G# is the leading tone of the local A minor, not of C major
        let mut discounted = AccidCost::new(true);
        assert!(!discounted.update(&step));
        assert_eq!(discounted.accid(), 0);
    }
}
