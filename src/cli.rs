use clap::Parser;
use log::info;
use pql_fmt_xml::{DEFAULT_MAX_DEPTH, ParserOptions};
use std::{collections::BTreeSet, path::PathBuf};

/// Translates XML query documents into PQL conditions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path of the XML query file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    queries: PathBuf,
    /// Zero-based indices of the properties to parse (all by default)
    #[arg(short, long, value_delimiter = ',')]
    select: Vec<usize>,
    /// Print the queries as JSON
    #[arg(long)]
    json: bool,
    /// Maximum nesting depth of formulae
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

impl Cli {
    pub fn run(&self) -> anyhow::Result<()> {
        let options = ParserOptions {
            parse_only: self.select.iter().copied().collect::<BTreeSet<_>>(),
            max_depth: self.max_depth,
        };
        let queries = pql_fmt_xml::load(&self.queries, options)?;
        info!("parsed {} queries", queries.len());
        print!("{}", crate::report(&queries, self.json)?);
        Ok(())
    }
}
