//! Static schema metadata: which models exist, where they live, and what
//! kind each field is.
//!
//! The schema is declared in configuration rather than discovered from the
//! database, so field discovery (`fields_of_kind`) is a pure lookup.

use crate::error::{DbError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Kind tag of a model field.
///
/// URL, email and slug fields are stored as char fields, so a search for
/// `CharField` includes them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum FieldKind {
    Text,
    Char,
    Url,
    Email,
    Slug,
    Other(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "TextField",
            Self::Char => "CharField",
            Self::Url => "URLField",
            Self::Email => "EmailField",
            Self::Slug => "SlugField",
            Self::Other(name) => name,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "TextField" => Self::Text,
            "CharField" => Self::Char,
            "URLField" => Self::Url,
            "EmailField" => Self::Email,
            "SlugField" => Self::Slug,
            other => Self::Other(other.to_string()),
        }
    }

    /// The storage kind this field reports.
    pub fn internal(&self) -> FieldKind {
        match self {
            Self::Url | Self::Email | Self::Slug => Self::Char,
            other => other.clone(),
        }
    }

    /// Whether a field of this kind is selected by a request for `requested`.
    pub fn matches(&self, requested: &FieldKind) -> bool {
        self == requested || self.internal() == *requested
    }
}

impl From<String> for FieldKind {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

/// Model declaration as written in configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSpec {
    /// Table name, defaults to `<app>_<model lowercased>`
    pub table: Option<String>,
    /// Primary key column, defaults to `id`
    pub primary_key: Option<String>,
    /// Column used to label records
    pub label: Option<String>,
    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// A fully resolved model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDef {
    pub app_label: String,
    pub name: String,
    pub table: String,
    pub primary_key: String,
    pub label: Option<String>,
    pub fields: Vec<FieldDef>,
}

impl ModelDef {
    fn resolve(app_label: &str, name: &str, spec: ModelSpec) -> Result<Self> {
        let mut seen = Vec::with_capacity(spec.fields.len());
        for field in &spec.fields {
            if field.name.is_empty() {
                return Err(DbError::invalid_schema(format!(
                    "{}.{} declares a field with an empty name",
                    app_label, name
                )));
            }
            if seen.contains(&field.name.as_str()) {
                return Err(DbError::invalid_schema(format!(
                    "{}.{} declares field '{}' twice",
                    app_label, name, field.name
                )));
            }
            seen.push(field.name.as_str());
        }

        Ok(Self {
            app_label: app_label.to_string(),
            name: name.to_string(),
            table: spec
                .table
                .unwrap_or_else(|| format!("{}_{}", app_label, name.to_lowercase())),
            primary_key: spec.primary_key.unwrap_or_else(|| "id".to_string()),
            label: spec.label,
            fields: spec.fields,
        })
    }

    /// `app.Model`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.app_label, self.name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of the fields selected by any of `kinds`, in declaration order.
    pub fn fields_of_kind(&self, kinds: &[FieldKind]) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| kinds.iter().any(|kind| field.kind.matches(kind)))
            .map(|field| field.name.as_str())
            .collect()
    }
}

/// All declared models, keyed by app label and lowercased model name.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    models: BTreeMap<(String, String), ModelDef>,
}

impl Schema {
    /// Build a schema from `[models.<app>.<Model>]` tables.
    pub fn from_specs(specs: BTreeMap<String, BTreeMap<String, ModelSpec>>) -> Result<Self> {
        let mut models = BTreeMap::new();
        for (app_label, app_models) in specs {
            for (name, spec) in app_models {
                let key = (app_label.clone(), name.to_lowercase());
                if models.contains_key(&key) {
                    return Err(DbError::invalid_schema(format!(
                        "model {}.{} is declared more than once",
                        app_label, name
                    )));
                }
                models.insert(key, ModelDef::resolve(&app_label, &name, spec)?);
            }
        }
        Ok(Self { models })
    }

    /// Look up a model. The model name is matched case-insensitively.
    pub fn model(&self, app_label: &str, name: &str) -> Result<&ModelDef> {
        self.models
            .get(&(app_label.to_string(), name.to_lowercase()))
            .ok_or_else(|| DbError::UnknownModel(format!("{}.{}", app_label, name)))
    }

    /// Fields of `model` selected by `kinds`.
    pub fn fields_of_kind(
        &self,
        app_label: &str,
        name: &str,
        kinds: &[FieldKind],
    ) -> Result<Vec<&str>> {
        Ok(self.model(app_label, name)?.fields_of_kind(kinds))
    }
}
