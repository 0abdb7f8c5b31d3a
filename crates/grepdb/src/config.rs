//! Configuration for grepdb
//!
//! Everything lives in one TOML file, by default `<home>/config.toml`:
//!
//! ```toml
//! database = "app.sqlite3"
//!
//! [sites]
//! default = "https://local.example.com"
//! production = "https://example.com"
//!
//! [presets.notes]
//! identifiers = ["blog.Post"]
//! ignore_case = true
//!
//! [models.blog.Post]
//! label = "title"
//! fields = [{ name = "body", kind = "TextField" }]
//! ```
//!
//! The file is read and validated once at startup; a broken preset fails
//! the run before any query is made.

use crate::highlight::DisplayMode;
use crate::identifier::Identifier;
use grepdb_db::{DbError, FieldKind, ModelSpec, Schema};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub use grepdb_logging::grepdb_home;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_ADMIN_PATH: &str = "/admin/";

/// Errors raised while loading or querying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("presets is not a table of named presets")]
    PresetsNotTable,

    #[error("Preset {name} is invalid: {reason}")]
    InvalidPreset { name: String, reason: String },

    #[error("Preset specified but no presets are configured")]
    NoPresets,

    #[error("Preset {0} is not defined")]
    UnknownPreset(String),

    #[error(transparent)]
    Schema(#[from] DbError),
}

/// Resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// File the configuration came from, if any
    pub source: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub admin_path: String,
    pub sites: BTreeMap<String, String>,
    /// `None` when no `[presets]` table exists
    pub presets: Option<BTreeMap<String, Preset>>,
    pub schema: Schema,
}

/// A named bundle of search parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preset {
    pub identifiers: Vec<Identifier>,
    pub ignore_case: bool,
    pub field_types: Vec<FieldKind>,
    /// `Some(None)` hides values
    pub show_values: Option<Option<DisplayMode>>,
    pub admin_links: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    database: Option<PathBuf>,
    admin_path: Option<String>,
    #[serde(default)]
    sites: BTreeMap<String, String>,
    presets: Option<toml::Value>,
    #[serde(default)]
    models: BTreeMap<String, BTreeMap<String, ModelSpec>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPreset {
    #[serde(default)]
    identifiers: Vec<String>,
    #[serde(default)]
    ignore_case: bool,
    #[serde(default)]
    field_types: Vec<FieldKind>,
    show_values: Option<String>,
    admin_links: Option<Vec<String>>,
}

impl Config {
    /// Path used when no config file is given.
    pub fn default_path() -> PathBuf {
        grepdb_home().join(CONFIG_FILE_NAME)
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. The default path may be missing, in
    /// which case an empty configuration is returned.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !required && !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self {
                admin_path: DEFAULT_ADMIN_PATH.to_string(),
                ..Self::default()
            });
        }

        let src = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let mut config = Self::from_toml_str(&src, path.parent())
            .map_err(|err| match err {
                ConfigError::Parse { source, .. } => ConfigError::Parse {
                    path: path.clone(),
                    source,
                },
                other => other,
            })?;
        config.source = Some(path);
        Ok(config)
    }

    /// Parse configuration text. Relative database paths are resolved
    /// against `base_dir`.
    pub fn from_toml_str(src: &str, base_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(src).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;

        let database = raw.database.map(|db| match base_dir {
            Some(dir) if db.is_relative() => dir.join(db),
            _ => db,
        });

        let presets = raw.presets.map(parse_presets).transpose()?;
        let schema = Schema::from_specs(raw.models)?;

        Ok(Self {
            source: None,
            database,
            admin_path: raw.admin_path.unwrap_or_else(|| DEFAULT_ADMIN_PATH.to_string()),
            sites: raw.sites,
            presets,
            schema,
        })
    }

    /// Look up a preset by name.
    pub fn preset(&self, name: &str) -> Result<&Preset, ConfigError> {
        let presets = self.presets.as_ref().ok_or(ConfigError::NoPresets)?;
        presets
            .get(name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
    }
}

fn parse_presets(value: toml::Value) -> Result<BTreeMap<String, Preset>, ConfigError> {
    let table = match value {
        toml::Value::Table(table) => table,
        _ => return Err(ConfigError::PresetsNotTable),
    };

    table
        .into_iter()
        .map(|(name, value)| {
            let preset = parse_preset(value).map_err(|reason| ConfigError::InvalidPreset {
                name: name.clone(),
                reason,
            })?;
            Ok((name, preset))
        })
        .collect()
}

fn parse_preset(value: toml::Value) -> Result<Preset, String> {
    if !value.is_table() {
        return Err("expected a table of search parameters".to_string());
    }
    let raw: RawPreset = value.try_into().map_err(|err: toml::de::Error| err.message().to_string())?;

    let identifiers = raw
        .identifiers
        .iter()
        .map(|id| id.parse::<Identifier>().map_err(|err| err.to_string()))
        .collect::<Result<Vec<_>, _>>()?;

    let show_values = raw
        .show_values
        .as_deref()
        .map(parse_show_values_setting)
        .transpose()?;

    Ok(Preset {
        identifiers,
        ignore_case: raw.ignore_case,
        field_types: raw.field_types,
        show_values,
        admin_links: raw.admin_links,
    })
}

/// `none` hides values, anything else is a display mode.
fn parse_show_values_setting(s: &str) -> Result<Option<DisplayMode>, String> {
    if s == "none" {
        return Ok(None);
    }
    DisplayMode::parse(s).map(Some)
}
