//! Pattern-filtered record lookup.

use crate::error::{DbError, Result};
use crate::schema::ModelDef;
use crate::types::Record;
use crate::GrepDb;
use futures::TryStreamExt;
use regex::Regex;
use sqlx::Row;
use tracing::debug;

impl GrepDb {
    /// Records of `model` whose `field` matches `pattern`, ordered by
    /// primary key. NULL values never match.
    pub async fn find_matching(
        &self,
        model: &ModelDef,
        field: &str,
        pattern: &Regex,
    ) -> Result<Vec<Record>> {
        if model.field(field).is_none() {
            return Err(DbError::UnknownField(format!(
                "{}.{}",
                model.qualified_name(),
                field
            )));
        }

        let sql = select_sql(model, field);
        debug!(model = %model.qualified_name(), field, sql = %sql, "Scanning field");

        let mut rows = sqlx::query(&sql).fetch(&self.pool);
        let mut scanned = 0usize;

        let mut records = Vec::new();
        while let Some(row) = rows.try_next().await? {
            scanned += 1;
            let value: String = row.try_get("value")?;
            if !pattern.is_match(&value) {
                continue;
            }
            let pk: String = row.try_get("pk")?;
            let label = match &model.label {
                Some(_) => row.try_get::<Option<String>, _>("label")?,
                None => None,
            }
            .unwrap_or_else(|| format!("{} object", model.name));
            records.push(Record { pk, label, value });
        }

        debug!(
            model = %model.qualified_name(),
            field,
            scanned,
            matched = records.len(),
            "Field scanned"
        );
        Ok(records)
    }
}

fn select_sql(model: &ModelDef, field: &str) -> String {
    let pk = quote_ident(&model.primary_key);
    let column = quote_ident(field);
    let label = model
        .label
        .as_deref()
        .map(|col| format!(", CAST({} AS TEXT) AS label", quote_ident(col)))
        .unwrap_or_default();

    format!(
        "SELECT CAST({pk} AS TEXT) AS pk, CAST({column} AS TEXT) AS value{label} \
         FROM {table} WHERE {column} IS NOT NULL ORDER BY {pk}",
        table = quote_ident(&model.table),
    )
}

/// Quote an SQL identifier, doubling embedded quotes.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
