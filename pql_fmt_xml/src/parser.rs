//! Translator from XML query documents to PQL conditions.

mod expression;
mod formula;
mod smc;
mod tree;
mod vocabulary;

pub use self::expression::parse_place;
pub use self::tree::*;
use anyhow::{Context, anyhow, bail};
use log::{debug, error, info, trace};
use pql_core::Condition;
use quick_xml::Reader;
use serde::Serialize;
use std::{collections::BTreeSet, fmt, io::BufRead};
use thiserror::Error;

/// Default bound on the nesting depth of formulae.
///
/// Translation is recursive: the bound keeps it within a 2 MiB thread stack,
/// the default for spawned threads, in unoptimized builds too.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Number of children a construct requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// Exactly this many children.
    Exactly(usize),
    /// At least this many children.
    AtLeast(usize),
}

impl Expected {
    fn admits(&self, found: usize) -> bool {
        match *self {
            Expected::Exactly(n) => found == n,
            Expected::AtLeast(n) => found >= n,
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Exactly(n) => write!(f, "exactly {n}"),
            Expected::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("root element must be `property-set`, found `{0}`")]
    UnexpectedRoot(String),
    #[error("expected `property` element, found `{0}`")]
    NotAProperty(String),
    #[error("unknown or unexpected tag `{tag}` in {context}")]
    UnexpectedTag { tag: String, context: &'static str },
    #[error("`{tag}` requires {expected} children, found {found}")]
    WrongArity {
        tag: String,
        expected: Expected,
        found: usize,
    },
    #[error("`until` requires `before` and `reach` children, found `{0}` and `{1}`")]
    UntilOperands(String, String),
    #[error("property has a missing or empty id")]
    MissingId,
    #[error("property `{0}` has no formula")]
    MissingFormula(String),
    #[error("`{0}` is not a valid integer")]
    InvalidInteger(String),
    #[error("invalid value `{value}` for attribute `{attr}`")]
    InvalidAttr { attr: &'static str, value: String },
    #[error("place with empty name")]
    EmptyPlace,
    #[error("nesting exceeds the maximum depth of {0}")]
    TooDeep(usize),
    #[error("unknown or unexpected end tag `{0}`")]
    UnexpectedEndTag(String),
    #[error("open tags have not been closed")]
    UnclosedTags,
    #[error("document has no root element")]
    NoRoot,
    #[error("document has multiple root elements")]
    MultipleRoots,
    #[error("text content outside of the root element")]
    TextOutsideRoot,
}

/// Returns the children of `node`, provided there are as many as expected.
fn expect_children(node: &XmlNode, expected: Expected) -> anyhow::Result<&[XmlNode]> {
    let children = node.children();
    if expected.admits(children.len()) {
        Ok(children)
    } else {
        error!(target: "parser", "'{}' requires {expected} children, found {}", node.tag(), children.len());
        Err(anyhow!(ParserError::WrongArity {
            tag: node.name().to_owned(),
            expected,
            found: children.len(),
        }))
    }
}

fn only_child(node: &XmlNode) -> anyhow::Result<&XmlNode> {
    Ok(&expect_children(node, Expected::Exactly(1))?[0])
}

fn unexpected(node: &XmlNode, context: &'static str) -> anyhow::Error {
    error!(target: "parser", "unknown or unexpected tag '{}' in {context}", node.tag());
    anyhow!(ParserError::UnexpectedTag {
        tag: node.name().to_owned(),
        context,
    })
}

/// Options of the [`QueryParser`].
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Zero-based indices of the properties to parse.
    /// If empty, all properties are parsed.
    pub parse_only: BTreeSet<usize>,
    /// Maximum nesting depth of formulae and expressions.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            parse_only: BTreeSet::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserOptions {
    fn selects(&self, index: usize) -> bool {
        self.parse_only.is_empty() || self.parse_only.contains(&index)
    }
}

/// Outcome of parsing a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParsingResult {
    /// The property was parsed, or skipped by selection.
    Ok,
    /// The property's tags mark it as not supported: its formula was not parsed.
    Unsupported,
}

/// A parsed property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryItem {
    /// The property's id; empty for skipped properties.
    pub id: String,
    /// The property's formula, if parsed.
    pub query: Option<Condition>,
    /// The parsing outcome.
    pub result: ParsingResult,
}

impl QueryItem {
    fn skipped() -> Self {
        QueryItem {
            id: String::new(),
            query: None,
            result: ParsingResult::Ok,
        }
    }

    /// Whether the property was excluded by selection.
    pub fn is_skipped(&self) -> bool {
        self.query.is_none() && self.result == ParsingResult::Ok
    }
}

/// Translates `property-set` documents into [`QueryItem`]s.
#[derive(Debug, Default)]
pub struct QueryParser {
    options: ParserOptions,
    queries: Vec<QueryItem>,
}

impl QueryParser {
    /// Creates a parser with the given options.
    pub fn new(options: ParserOptions) -> Self {
        QueryParser {
            options,
            queries: Vec::new(),
        }
    }

    /// The queries parsed so far, one per property in document order.
    pub fn queries(&self) -> &[QueryItem] {
        &self.queries
    }

    /// Consumes the parser, returning the parsed queries.
    pub fn into_queries(self) -> Vec<QueryItem> {
        self.queries
    }

    /// Reads a whole query document and parses its properties.
    pub fn parse<R: BufRead>(&mut self, reader: &mut Reader<R>) -> anyhow::Result<()> {
        let root = XmlNode::parse(reader).context("failed to read query document")?;
        self.parse_property_set(&root)
    }

    /// Parses the properties of a `property-set` element.
    ///
    /// Properties excluded by [`ParserOptions::parse_only`] are recorded as skipped.
    /// On failure no query of the document is retained.
    pub fn parse_property_set(&mut self, root: &XmlNode) -> anyhow::Result<()> {
        let len = self.queries.len();
        let result = self.walk_property_set(root);
        if result.is_err() {
            self.queries.truncate(len);
        }
        result
    }

    fn walk_property_set(&mut self, root: &XmlNode) -> anyhow::Result<()> {
        if *root.tag() != Tag::PropertySet {
            error!(target: "parser", "missing property-set, found '{}'", root.tag());
            bail!(ParserError::UnexpectedRoot(root.name().to_owned()));
        }
        info!(target: "parser", "parsing {} properties", root.children().len());
        for (index, property) in root.children().iter().enumerate() {
            let query = if self.options.selects(index) {
                self.parse_property(property)
                    .with_context(|| format!("failed to parse property at index {index}"))?
            } else {
                trace!(target: "parser", "skipping property at index {index}");
                QueryItem::skipped()
            };
            self.queries.push(query);
        }
        info!(target: "parser", "parsing completed");
        Ok(())
    }

    fn parse_property(&self, node: &XmlNode) -> anyhow::Result<QueryItem> {
        if *node.tag() != Tag::Property {
            error!(target: "parser", "missing property, found '{}'", node.tag());
            bail!(ParserError::NotAProperty(node.name().to_owned()));
        }
        let mut id = None;
        let mut formula = None;
        let mut tags_ok = true;
        let mut smc = None;
        let mut observations = None;
        for child in node.children() {
            match child.tag() {
                Tag::Id => id = Some(child.text().trim()),
                Tag::Formula => formula = Some(child),
                Tag::Tags => tags_ok = Self::parse_tags(child),
                Tag::Smc => smc = Some(child),
                Tag::Observations => observations = Some(child),
                _ => trace!(target: "parser", "ignoring '{}' in property", child.tag()),
            }
        }
        let id = id.filter(|id| !id.is_empty()).ok_or_else(|| {
            error!(target: "parser", "a query with empty id");
            anyhow!(ParserError::MissingId)
        })?;
        debug!(target: "parser", "parsing property '{id}'");

        if !tags_ok {
            debug!(target: "parser", "property '{id}' is not supported");
            return Ok(QueryItem {
                id: id.to_owned(),
                query: None,
                result: ParsingResult::Unsupported,
            });
        }

        let formula = formula.ok_or_else(|| {
            error!(target: "parser", "property '{id}' has no formula");
            anyhow!(ParserError::MissingFormula(id.to_owned()))
        })?;
        let query = if let Some(smc) = smc {
            let settings = smc::parse_smc_settings(smc)
                .with_context(|| format!("failed to parse SMC settings of property '{id}'"))?;
            let mut query = self
                .parse_smc_formula(settings, formula)
                .with_context(|| format!("failed to parse formula of property '{id}'"))?;
            if let Some(observations) = observations {
                let observables = self
                    .parse_observables(observations)
                    .with_context(|| format!("failed to parse observables of property '{id}'"))?;
                *query
                    .observables_mut()
                    .ok_or_else(|| anyhow!("property '{id}' is not a statistical query"))? =
                    observables;
            }
            query
        } else {
            self.parse_formula(formula)
                .with_context(|| format!("failed to parse formula of property '{id}'"))?
        };

        Ok(QueryItem {
            id: id.to_owned(),
            query: Some(query),
            result: ParsingResult::Ok,
        })
    }

    // Properties tagged `is-reachability` with the exact text `true` are unsupported.
    fn parse_tags(node: &XmlNode) -> bool {
        !node
            .children()
            .iter()
            .any(|tag| *tag.tag() == Tag::IsReachability && tag.text() == vocabulary::VAL_TRUE)
    }

    /// Increases the nesting depth, failing past [`ParserOptions::max_depth`].
    fn descend(&self, depth: usize) -> anyhow::Result<usize> {
        if depth >= self.options.max_depth {
            error!(target: "parser", "nesting exceeds the maximum depth of {}", self.options.max_depth);
            bail!(ParserError::TooDeep(self.options.max_depth));
        }
        Ok(depth + 1)
    }
}
