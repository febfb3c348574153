//! Translator from XML query documents to PQL conditions.
//!
//! A document is a `property-set` of `property` elements,
//! each with an `id` and a `formula`;
//! statistical properties also carry an `smc` element and optional `observations`.

mod parser;

use anyhow::Context;
use log::info;
pub use parser::*;
pub use pql_core;
use quick_xml::Reader;
use std::path::Path;

/// Parses the query document at `path`.
pub fn load(path: &Path, options: ParserOptions) -> anyhow::Result<Vec<QueryItem>> {
    info!(target: "parser", "parsing query file '{}'", path.display());
    let mut reader = Reader::from_file(path)
        .with_context(|| format!("failed to create reader from file '{}'", path.display()))?;
    let mut parser = QueryParser::new(options);
    parser
        .parse(&mut reader)
        .with_context(|| format!("failed to parse queries in '{}'", path.display()))?;
    Ok(parser.into_queries())
}
