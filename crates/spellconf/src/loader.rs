//! Config file discovery, loading, and environment variable overlay.

use crate::{
    Branching, ConfigError, CostKind, EnharmonicFilter, LocalDistance, SpellConfig, TieBreakMode,
    TonalityPreset,
};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with an explicit override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/pitch-spell/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("pitch-spell/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("pitch-spell.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load config from a TOML file. Missing keys keep their defaults.
pub fn load_from_file(path: &Path) -> Result<SpellConfig, ConfigError> {
    let mut config = SpellConfig::default();
    load_layer(path)?.apply(&mut config);
    Ok(config)
}

/// Read the keys a TOML file sets, without filling in defaults.
pub fn load_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_layer(&contents, path)
}

fn parse_err(path: &Path, message: impl Into<String>) -> ConfigError {
    ConfigError::Parse {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn get_option<T: FromStr<Err = ConfigError>>(
    section: &toml::Table,
    key: &str,
    path: &Path,
) -> Result<Option<T>, ConfigError> {
    match section.get(key) {
        None => Ok(None),
        Some(value) => {
            let text = value
                .as_str()
                .ok_or_else(|| parse_err(path, format!("{} must be a string", key)))?;
            text.parse().map(Some)
        }
    }
}

fn get_bool(section: &toml::Table, key: &str, path: &Path) -> Result<Option<bool>, ConfigError> {
    match section.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| parse_err(path, format!("{} must be a boolean", key))),
    }
}

fn get_tolerance(section: &toml::Table, key: &str, path: &Path) -> Result<Option<f64>, ConfigError> {
    let value = match section.get(key) {
        None => return Ok(None),
        Some(toml::Value::Float(f)) => *f,
        Some(toml::Value::Integer(i)) => *i as f64,
        Some(_) => return Err(parse_err(path, format!("{} must be a number", key))),
    };
    check_tolerance(key, value).map(Some)
}

fn check_tolerance(key: &str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// The keys set by one config file. Unset keys leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigLayer {
    pub cost: Option<CostKind>,
    pub tie_break: Option<TieBreakMode>,
    pub tonal: Option<bool>,
    pub octave_scoped: Option<bool>,
    pub lead_discount: Option<bool>,
    pub enharmonics: Option<EnharmonicFilter>,
    pub branching: Option<Branching>,
    pub preset: Option<TonalityPreset>,
    pub local_distance: Option<LocalDistance>,
    pub global_tolerance: Option<f64>,
    pub tie_break_warnings: Option<bool>,
}

impl ConfigLayer {
    /// Write every key this layer sets into `config`.
    pub fn apply(self, config: &mut SpellConfig) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }

        set(&mut config.search.cost, self.cost);
        set(&mut config.search.tie_break, self.tie_break);
        set(&mut config.search.tonal, self.tonal);
        set(&mut config.search.octave_scoped, self.octave_scoped);
        set(&mut config.search.lead_discount, self.lead_discount);
        set(&mut config.search.enharmonics, self.enharmonics);
        set(&mut config.search.branching, self.branching);
        set(&mut config.tonalities.preset, self.preset);
        set(&mut config.tonalities.local_distance, self.local_distance);
        set(&mut config.tonalities.global_tolerance, self.global_tolerance);
        set(&mut config.diagnostics.tie_break_warnings, self.tie_break_warnings);
    }
}

pub(crate) fn parse_layer(contents: &str, path: &Path) -> Result<ConfigLayer, ConfigError> {
    let table: toml::Table = contents
        .parse()
        .map_err(|e: toml::de::Error| parse_err(path, e.to_string()))?;

    let mut layer = ConfigLayer::default();
    if let Some(section) = table.get("search").and_then(|v| v.as_table()) {
        layer.cost = get_option(section, "cost", path)?;
        layer.tie_break = get_option(section, "tie_break", path)?;
        layer.tonal = get_bool(section, "tonal", path)?;
        layer.octave_scoped = get_bool(section, "octave_scoped", path)?;
        layer.lead_discount = get_bool(section, "lead_discount", path)?;
        layer.enharmonics = get_option(section, "enharmonics", path)?;
        layer.branching = get_option(section, "branching", path)?;
    }
    if let Some(section) = table.get("tonalities").and_then(|v| v.as_table()) {
        layer.preset = get_option(section, "preset", path)?;
        layer.local_distance = get_option(section, "local_distance", path)?;
        layer.global_tolerance = get_tolerance(section, "global_tolerance", path)?;
    }
    if let Some(section) = table.get("diagnostics").and_then(|v| v.as_table()) {
        layer.tie_break_warnings = get_bool(section, "tie_break_warnings", path)?;
    }
    Ok(layer)
}

/// Parse config from TOML string. Missing keys keep their defaults.
pub(crate) fn parse_toml(contents: &str, path: &Path) -> Result<SpellConfig, ConfigError> {
    let mut config = SpellConfig::default();
    parse_layer(contents, path)?.apply(&mut config);
    Ok(config)
}

fn env_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(
    config: &mut SpellConfig,
    sources: &mut ConfigSources,
) -> Result<(), ConfigError> {
    apply_overrides_from(config, sources, |key| env::var(key).ok())
}

/// Overlay values from `lookup`, which maps `PITCH_SPELL_*` names to values.
pub fn apply_overrides_from(
    config: &mut SpellConfig,
    sources: &mut ConfigSources,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(v) = lookup("PITCH_SPELL_COST") {
        config.search.cost = v.parse()?;
        sources.env_overrides.push("PITCH_SPELL_COST".to_string());
    }
    if let Some(v) = lookup("PITCH_SPELL_TIE_BREAK") {
        config.search.tie_break = v.parse()?;
        sources.env_overrides.push("PITCH_SPELL_TIE_BREAK".to_string());
    }
    if let Some(v) = lookup("PITCH_SPELL_TONAL") {
        config.search.tonal = env_bool("PITCH_SPELL_TONAL", &v)?;
        sources.env_overrides.push("PITCH_SPELL_TONAL".to_string());
    }
    if let Some(v) = lookup("PITCH_SPELL_OCTAVE_SCOPED") {
        config.search.octave_scoped = env_bool("PITCH_SPELL_OCTAVE_SCOPED", &v)?;
        sources.env_overrides.push("PITCH_SPELL_OCTAVE_SCOPED".to_string());
    }
    if let Some(v) = lookup("PITCH_SPELL_LEAD_DISCOUNT") {
        config.search.lead_discount = env_bool("PITCH_SPELL_LEAD_DISCOUNT", &v)?;
        sources.env_overrides.push("PITCH_SPELL_LEAD_DISCOUNT".to_string());
    }
    if let Some(v) = lookup("PITCH_SPELL_ENHARMONICS") {
        config.search.enharmonics = v.parse()?;
        sources.env_overrides.push("PITCH_SPELL_ENHARMONICS".to_string());
    }
    if let Some(v) = lookup("PITCH_SPELL_BRANCHING") {
        config.search.branching = v.parse()?;
        sources.env_overrides.push("PITCH_SPELL_BRANCHING".to_string());
    }
    if let Some(v) = lookup("PITCH_SPELL_TONALITIES") {
        config.tonalities.preset = v.parse()?;
        sources.env_overrides.push("PITCH_SPELL_TONALITIES".to_string());
    }
    if let Some(v) = lookup("PITCH_SPELL_LOCAL_DISTANCE") {
        config.tonalities.local_distance = v.parse()?;
        sources.env_overrides.push("PITCH_SPELL_LOCAL_DISTANCE".to_string());
    }
    if let Some(v) = lookup("PITCH_SPELL_GLOBAL_TOLERANCE") {
        let value = v.trim().parse::<f64>().map_err(|_| ConfigError::InvalidValue {
            key: "PITCH_SPELL_GLOBAL_TOLERANCE".to_string(),
            value: v.clone(),
        })?;
        config.tonalities.global_tolerance = check_tolerance("PITCH_SPELL_GLOBAL_TOLERANCE", value)?;
        sources.env_overrides.push("PITCH_SPELL_GLOBAL_TOLERANCE".to_string());
    }
    if let Some(v) = lookup("PITCH_SPELL_TIE_BREAK_WARNINGS") {
        config.diagnostics.tie_break_warnings = env_bool("PITCH_SPELL_TIE_BREAK_WARNINGS", &v)?;
        sources
            .env_overrides
            .push("PITCH_SPELL_TIE_BREAK_WARNINGS".to_string());
    }

    Ok(())
}
