//! Enumerated option values shared by the config file, the environment
//! overlay and the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ConfigError;

/// Which cost model drives the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostKind {
    /// Printed accidentals only.
    Accid,
    /// Printed accidentals, then tie-break counters.
    AccidTieBreak,
    /// Printed accidentals, then distance to the local tonality, then tie-breaks.
    AccidDist,
    /// Printed accidentals plus local distance as one primary field.
    AccidDistPlus,
}

/// How tie-break counters are compared once the primary fields agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakMode {
    /// color, then Cb/B#/E#/Fb, then doubles, then chromatic mismatch
    Lex,
    /// sum of the three minor counters, then chromatic mismatch, then color
    Sum,
}

/// Which enharmonic spellings the search may try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnharmonicFilter {
    Full,
    /// Drops Fbb, B## and E##.
    Short,
    /// Drops every double accidental.
    NoDouble,
    /// Drops Cb, B#, E# and Fb.
    NoRare,
    /// Both `NoDouble` and `NoRare`.
    Restricted,
}

/// Successor generation policy for single notes and new chord pitch classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branching {
    /// Try every defined enharmonic candidate.
    Exhaustive,
    /// One candidate: the spelling in the chromatic-harmonic scale.
    Chromatic,
}

/// Built-in lists of candidate tonalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TonalityPreset {
    /// Start empty; the caller adds tonalities.
    Empty,
    /// Majors -4..7 and harmonic minors -6..6.
    Default25,
    /// Majors and harmonic minors -6..6.
    Default26,
    /// Majors and harmonic minors -7..7.
    Default30,
}

/// Distance used to break ties during local tonality estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalDistance {
    Diatonic,
    Weber,
}

macro_rules! string_options {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(ConfigError::InvalidValue {
                        key: stringify!($ty).to_string(),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_options!(CostKind {
    Accid => "accid",
    AccidTieBreak => "accid_tie_break",
    AccidDist => "accid_dist",
    AccidDistPlus => "accid_dist_plus",
});

string_options!(TieBreakMode {
    Lex => "lex",
    Sum => "sum",
});

string_options!(EnharmonicFilter {
    Full => "full",
    Short => "short",
    NoDouble => "no_double",
    NoRare => "no_rare",
    Restricted => "restricted",
});

string_options!(Branching {
    Exhaustive => "exhaustive",
    Chromatic => "chromatic",
});

string_options!(TonalityPreset {
    Empty => "empty",
    Default25 => "default25",
    Default26 => "default26",
    Default30 => "default30",
});

string_options!(LocalDistance {
    Diatonic => "diatonic",
    Weber => "weber",
});
