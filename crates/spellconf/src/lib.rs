//! Configuration loading for the pitch-spell engine.
//!
//! Settings fall into three sections:
//!
//! - **Search** (`SearchConfig`): cost model, state initialization and
//!   enharmonic branching used by every bar search.
//! - **Tonalities** (`TonalitiesConfig`): the default candidate list and the
//!   distance used when estimating local tonalities.
//! - **Diagnostics** (`DiagnosticsConfig`): how loudly ambiguity is reported.
//!
//! # Usage
//!
//! ```rust,no_run
//! use spellconf::SpellConfig;
//!
//! let config = SpellConfig::load().expect("Failed to load config");
//! println!("cost model: {}", config.search.cost);
//! println!("tonalities: {}", config.tonalities.preset);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/pitch-spell/config.toml` (system)
//! 2. `~/.config/pitch-spell/config.toml` (user)
//! 3. `./pitch-spell.toml` (local override)
//! 4. Environment variables (`PITCH_SPELL_*`)
//!
//! # Example Config
//!
//! ```toml
//! [search]
//! cost = "accid_dist"
//! tie_break = "lex"
//! tonal = true
//! octave_scoped = false
//! lead_discount = false
//! enharmonics = "full"
//! branching = "exhaustive"
//!
//! [tonalities]
//! preset = "default30"
//! local_distance = "diatonic"
//! global_tolerance = 0.0
//!
//! [diagnostics]
//! tie_break_warnings = true
//! ```

pub mod loader;
pub mod options;

pub use loader::{discover_config_files_with_override, ConfigLayer, ConfigSources};
pub use options::{
    Branching, CostKind, EnharmonicFilter, LocalDistance, TieBreakMode, TonalityPreset,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Settings for the per-bar best-path search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub cost: CostKind,
    pub tie_break: TieBreakMode,
    /// Seed accidental states from the key signature (true) or the full mode scale.
    pub tonal: bool,
    /// Accidentals persist per (letter, octave) instead of per letter.
    pub octave_scoped: bool,
    /// Do not charge the raised leading tone of a minor global tonality.
    pub lead_discount: bool,
    pub enharmonics: EnharmonicFilter,
    pub branching: Branching,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cost: CostKind::AccidDist,
            tie_break: TieBreakMode::Lex,
            tonal: true,
            octave_scoped: false,
            lead_discount: false,
            enharmonics: EnharmonicFilter::Full,
            branching: Branching::Exhaustive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TonalitiesConfig {
    pub preset: TonalityPreset,
    pub local_distance: LocalDistance,
    /// Rows whose first-pass cost is within this many percent of the best
    /// stay global candidates. 0 keeps exact ties only.
    pub global_tolerance: f64,
}

impl Default for TonalitiesConfig {
    fn default() -> Self {
        Self {
            preset: TonalityPreset::Default30,
            local_distance: LocalDistance::Diatonic,
            global_tolerance: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Log unresolved ties at warn level rather than debug.
    pub tie_break_warnings: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            tie_break_warnings: true,
        }
    }
}

/// Complete pitch-spell configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SpellConfig {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub tonalities: TonalitiesConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl SpellConfig {
    /// Load configuration from all sources.
    ///
    /// Load order (later wins):
    /// 1. Compiled defaults
    /// 2. `/etc/pitch-spell/config.toml`
    /// 3. `~/.config/pitch-spell/config.toml`
    /// 4. `./pitch-spell.toml`
    /// 5. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration with an explicit file replacing the local override.
    pub fn load_from(config_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = SpellConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            loader::load_layer(&path)?.apply(&mut config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources)?;

        Ok((config, sources))
    }

    /// Parse a configuration from TOML text, without touching the filesystem.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        loader::parse_toml(contents, std::path::Path::new("<inline>"))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# pitch-spell configuration\n\n");

        output.push_str("[search]\n");
        output.push_str(&format!("cost = \"{}\"\n", self.search.cost));
        output.push_str(&format!("tie_break = \"{}\"\n", self.search.tie_break));
        output.push_str(&format!("tonal = {}\n", self.search.tonal));
        output.push_str(&format!("octave_scoped = {}\n", self.search.octave_scoped));
        output.push_str(&format!("lead_discount = {}\n", self.search.lead_discount));
        output.push_str(&format!("enharmonics = \"{}\"\n", self.search.enharmonics));
        output.push_str(&format!("branching = \"{}\"\n", self.search.branching));

        output.push_str("\n[tonalities]\n");
        output.push_str(&format!("preset = \"{}\"\n", self.tonalities.preset));
        output.push_str(&format!(
            "local_distance = \"{}\"\n",
            self.tonalities.local_distance
        ));
        output.push_str(&format!(
            "global_tolerance = {:?}\n",
            self.tonalities.global_tolerance
        ));

        output.push_str("\n[diagnostics]\n");
        output.push_str(&format!(
            "tie_break_warnings = {}\n",
            self.diagnostics.tie_break_warnings
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SpellConfig::default();
        assert_eq!(config.search.cost, CostKind::AccidDist);
        assert!(config.search.tonal);
        assert_eq!(config.tonalities.preset, TonalityPreset::Default30);
    }

    #[test]
    fn test_to_toml() {
        let config = SpellConfig::default();
        let toml = config.to_toml();
        assert!(toml.contains("[search]"));
        assert!(toml.contains("[tonalities]"));
        assert!(toml.contains("cost = \"accid_dist\""));
        assert!(toml.contains("preset = \"default30\""));
    }

    #[test]
    fn test_to_toml_parses_back() {
        let mut config = SpellConfig::default();
        config.search.cost = CostKind::AccidDistPlus;
        config.search.enharmonics = EnharmonicFilter::NoRare;
        config.tonalities.local_distance = LocalDistance::Weber;
        config.tonalities.global_tolerance = 12.5;

        let parsed = SpellConfig::from_toml_str(&config.to_toml()).unwrap();
        assert_eq!(parsed, config);
    }
}
