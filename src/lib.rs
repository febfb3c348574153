//! PQL is a translator of XML query documents
//! into the abstract syntax of the Petri net Query Language.
//!
//! Supported queries:
//!
//! - [x] reachability (invariant, impossibility, possibility)
//! - [x] CTL
//! - [x] global properties (k-safe, control)
//! - [x] statistical queries (SMC) with observables

mod cli;

pub use cli::Cli;
pub use pql_fmt_xml;
use pql_core::Condition;
use pql_fmt_xml::{ParsingResult, QueryItem};
use serde::Serialize;
use std::fmt::Write;

/// Outcome of a query record, as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The formula was parsed.
    Ok,
    /// The property is not supported.
    Unsupported,
    /// The property was excluded by selection.
    Skipped,
}

impl From<&QueryItem> for Outcome {
    fn from(item: &QueryItem) -> Self {
        if item.is_skipped() {
            Outcome::Skipped
        } else if item.result == ParsingResult::Unsupported {
            Outcome::Unsupported
        } else {
            Outcome::Ok
        }
    }
}

#[derive(Serialize)]
struct Record<'a> {
    index: usize,
    id: &'a str,
    outcome: Outcome,
    formula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a Condition>,
}

/// Renders the parsed queries, one line per record or as a JSON array.
pub fn report(queries: &[QueryItem], json: bool) -> anyhow::Result<String> {
    let records: Vec<Record> = queries
        .iter()
        .enumerate()
        .map(|(index, item)| Record {
            index,
            id: &item.id,
            outcome: Outcome::from(item),
            formula: item.query.as_ref().map(ToString::to_string),
            query: item.query.as_ref(),
        })
        .collect();
    if json {
        return Ok(serde_json::to_string_pretty(&records)?);
    }
    let mut out = String::new();
    for record in records {
        let outcome = match record.outcome {
            Outcome::Ok => "ok",
            Outcome::Unsupported => "unsupported",
            Outcome::Skipped => "skipped",
        };
        write!(out, "{} {outcome}", record.index)?;
        if !record.id.is_empty() {
            write!(out, " {}", record.id)?;
        }
        if let Some(formula) = record.formula {
            write!(out, " {formula}")?;
        }
        writeln!(out)?;
    }
    Ok(out)
}
