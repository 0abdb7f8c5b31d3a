//! CLI module for grepdb
//!
//! One command: search the text fields of the named models for a pattern
//! and print each matching record with its admin links and highlighted
//! value.

pub mod error;
pub mod output;
pub mod search;

use crate::admin::AdminLinks;
use crate::config::Config;
use crate::highlight::DisplayMode;
use crate::identifier::Identifier;
use anyhow::{Context, Result};
use clap::Parser;
use error::HelpfulError;
use grepdb_db::GrepDb;
use output::{ColorChoice, Palette};
use search::SearchOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "grepdb",
    version,
    about = "Search database fields for a regular expression"
)]
pub struct Cli {
    /// Regular expression to search for
    pub pattern: String,

    /// Models or fields to search: app.Model or app.Model.field
    pub identifiers: Vec<Identifier>,

    /// Show matching values: `l` (matching lines, the default), `a` (entire
    /// value) or N (N characters either side of each match)
    #[arg(
        short = 's',
        long = "show-values",
        num_args = 0..=1,
        value_name = "STYLE",
        value_parser = DisplayMode::parse
    )]
    pub show_values: Option<Option<DisplayMode>>,

    /// Case-insensitive matching
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    /// Search TextFields of models named without a field
    #[arg(short = 't', long = "find-text-fields")]
    pub find_text_fields: bool,

    /// Search CharFields (and URL, email and slug fields)
    #[arg(short = 'c', long = "find-char-fields")]
    pub find_char_fields: bool,

    /// Search fields of this kind, e.g. EmailField (repeatable)
    #[arg(short = 'f', long = "find-fields", value_name = "KIND")]
    pub find_fields: Vec<String>,

    /// Print admin links for these hostnames or site names; with no value
    /// links are disabled
    #[arg(short = 'l', long = "admin-links", num_args = 0.., value_name = "HOST")]
    pub admin_links: Option<Vec<String>>,

    /// Named preset from the config file
    #[arg(short = 'p', long)]
    pub preset: Option<String>,

    /// Config file (defaults to <home>/config.toml)
    #[arg(long, env = "GREPDB_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database to search (overrides the config file)
    #[arg(long, env = "GREPDB_DATABASE")]
    pub database: Option<PathBuf>,

    /// When to colour output
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Log to stderr at the file log level
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Run a search and print the report to stdout.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let preset = cli
        .preset
        .as_deref()
        .map(|name| config.preset(name))
        .transpose()?;

    let options = SearchOptions::resolve(&cli, preset)?;
    let admin = AdminLinks::resolve(&options.admin_references, &config.sites, &config.admin_path)?;
    let queries = search::plan(&config.schema, &options.identifiers, &options.field_kinds)?;

    if queries.is_empty() {
        debug!("Nothing to search");
        return Ok(());
    }

    let db_path = match cli.database.clone().or_else(|| config.database.clone()) {
        Some(path) => path,
        None => {
            let config_path = config.source.clone().unwrap_or_else(Config::default_path);
            return Err(HelpfulError::no_database(&config_path).into());
        }
    };
    if !db_path.exists() {
        return Err(HelpfulError::database_not_found(&db_path).into());
    }

    let palette = Palette::new(cli.color.enabled());
    info!(
        pattern = %cli.pattern,
        fields = queries.len(),
        database = %db_path.display(),
        "Searching"
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    rt.block_on(async {
        let db = GrepDb::open_existing(&db_path).await?;
        let stdout = std::io::stdout();
        let mut out = std::io::BufWriter::new(stdout.lock());
        let result = search::execute(&db, &queries, &options, &admin, palette, &mut out).await;
        out.flush()?;
        db.close().await;
        result.map(|_| ())
    })
}
