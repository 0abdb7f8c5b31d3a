//! The search command: resolve options, plan per-field queries, run them
//! and print the report.

use crate::admin::{AdminLinks, DEFAULT_SITE};
use crate::cli::error::HelpfulError;
use crate::cli::output::Palette;
use crate::cli::Cli;
use crate::config::Preset;
use crate::highlight::{render, DisplayMode, MatchPattern};
use crate::identifier::Identifier;
use grepdb_db::{DbError, FieldKind, GrepDb, ModelDef, Schema};
use std::io::Write;
use tracing::{debug, info};

/// Search parameters after merging the command line with a preset.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub pattern: MatchPattern,
    pub identifiers: Vec<Identifier>,
    /// Kinds searched when an identifier names no field
    pub field_kinds: Vec<FieldKind>,
    /// `None` hides values
    pub show_values: Option<DisplayMode>,
    /// Hostnames or site names; empty disables links
    pub admin_references: Vec<String>,
}

impl SearchOptions {
    /// Merge `cli` with `preset`.
    ///
    /// Identifiers and field kinds are combined, `ignore_case` is set if
    /// either side sets it, and the preset's `show_values`/`admin_links`
    /// apply only when the flag was not given.
    pub fn resolve(cli: &Cli, preset: Option<&Preset>) -> Result<Self, HelpfulError> {
        let ignore_case = cli.ignore_case || preset.is_some_and(|p| p.ignore_case);
        let pattern = MatchPattern::new(&cli.pattern, ignore_case)
            .map_err(|err| HelpfulError::invalid_pattern(&cli.pattern, &err.to_string()))?;

        let mut identifiers = cli.identifiers.clone();
        if let Some(preset) = preset {
            identifiers.extend(preset.identifiers.iter().cloned());
        }

        let mut field_kinds = Vec::new();
        if cli.find_text_fields {
            field_kinds.push(FieldKind::Text);
        }
        if cli.find_char_fields {
            field_kinds.push(FieldKind::Char);
        }
        field_kinds.extend(cli.find_fields.iter().map(|name| FieldKind::parse(name)));
        if let Some(preset) = preset {
            field_kinds.extend(preset.field_types.iter().cloned());
        }
        let mut unique = Vec::with_capacity(field_kinds.len());
        for kind in field_kinds {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }
        if unique.is_empty() {
            unique.push(FieldKind::Text);
        }

        let show_values = cli
            .show_values
            .or_else(|| preset.and_then(|p| p.show_values))
            .unwrap_or(Some(DisplayMode::LineOnly));

        let admin_references = cli
            .admin_links
            .clone()
            .or_else(|| preset.and_then(|p| p.admin_links.clone()))
            .unwrap_or_else(|| vec![DEFAULT_SITE.to_string()]);

        Ok(Self {
            pattern,
            identifiers,
            field_kinds: unique,
            show_values,
            admin_references,
        })
    }
}

/// One model field to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldQuery<'a> {
    pub model: &'a ModelDef,
    pub field: String,
}

/// Expand identifiers into field queries, in identifier order.
pub fn plan<'a>(
    schema: &'a Schema,
    identifiers: &[Identifier],
    field_kinds: &[FieldKind],
) -> Result<Vec<FieldQuery<'a>>, HelpfulError> {
    let mut queries = Vec::new();
    for identifier in identifiers {
        let model = schema
            .model(&identifier.app_label, &identifier.model)
            .map_err(|_| {
                HelpfulError::unknown_model(&format!("{}.{}", identifier.app_label, identifier.model))
            })?;

        if identifier.fields.is_empty() {
            let fields = model.fields_of_kind(field_kinds);
            debug!(model = %model.qualified_name(), ?fields, "Discovered fields");
            queries.extend(fields.into_iter().map(|field| FieldQuery {
                model,
                field: field.to_string(),
            }));
            continue;
        }

        for field in &identifier.fields {
            if model.field(field).is_none() {
                let known: Vec<&str> = model.fields.iter().map(|f| f.name.as_str()).collect();
                return Err(HelpfulError::unknown_field(&model.qualified_name(), field, &known));
            }
            queries.push(FieldQuery {
                model,
                field: field.clone(),
            });
        }
    }
    Ok(queries)
}

/// Counters for one search run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub fields_searched: usize,
    pub fields_matched: usize,
    pub records: usize,
}

/// Run `queries` and write the report to `out`.
pub async fn execute<W: Write>(
    db: &GrepDb,
    queries: &[FieldQuery<'_>],
    options: &SearchOptions,
    admin: &AdminLinks,
    palette: Palette,
    out: &mut W,
) -> anyhow::Result<SearchSummary> {
    let mut summary = SearchSummary::default();

    for query in queries {
        summary.fields_searched += 1;
        let records = match db
            .find_matching(query.model, &query.field, options.pattern.regex())
            .await
        {
            Ok(records) => records,
            Err(DbError::Sqlx(err)) => {
                return Err(HelpfulError::new(format!(
                    "Failed to search {} {}",
                    query.model.qualified_name(),
                    query.field
                ))
                .with_context(err.to_string())
                .with_suggestion(format!(
                    "TRY: Check that table \"{}\" has a column \"{}\"",
                    query.model.table, query.field
                ))
                .into());
            }
            Err(other) => return Err(other.into()),
        };

        if records.is_empty() {
            continue;
        }
        summary.fields_matched += 1;
        summary.records += records.len();

        writeln!(out)?;
        writeln!(
            out,
            "{}",
            palette.heading(&format!("{} {}", query.model.qualified_name(), query.field))
        )?;

        for record in &records {
            writeln!(out, "{}", palette.record(&record.to_string()))?;
            for link in admin.links_for(query.model, &record.pk) {
                writeln!(out, "{}", palette.link(&link))?;
            }
            if let Some(mode) = options.show_values {
                let rendered = render(&record.value, &options.pattern, mode, palette.marker());
                out.write_all(rendered.as_bytes())?;
            }
        }
    }

    out.flush()?;
    info!(
        fields_searched = summary.fields_searched,
        fields_matched = summary.fields_matched,
        records = summary.records,
        "Search finished"
    );
    Ok(summary)
}
