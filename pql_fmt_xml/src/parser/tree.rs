//! Attribute tree of a query document.
//!
//! The document is read once into a tree of [`XmlNode`]s,
//! whose tags are resolved into [`Tag`]s at ingestion time.

use super::vocabulary::*;
use super::ParserError;
use anyhow::{Context, anyhow, bail};
use log::{error, trace};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::{collections::HashMap, fmt, io::BufRead, str::FromStr};

/// Maximum nesting of elements accepted while reading a document.
pub const MAX_NESTING: usize = 1 << 12;

/// Element kinds of the query language.
///
/// Elements outside the language are kept as [`Tag::Other`],
/// so that they can be ignored where allowed and reported otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    PropertySet,
    Property,
    Id,
    Formula,
    Tags,
    IsReachability,
    Smc,
    Observations,
    Watch,
    KSafe,
    Control,
    Invariant,
    Impossibility,
    Possibility,
    ExistsPath,
    AllPaths,
    Next,
    Globally,
    Finally,
    Until,
    Before,
    Reach,
    Deadlock,
    True,
    False,
    Negation,
    Conjunction,
    Disjunction,
    ExclusiveDisjunction,
    Implication,
    Equivalence,
    IntegerEq,
    IntegerNe,
    IntegerLt,
    IntegerLe,
    IntegerGt,
    IntegerGe,
    IntegerConstant,
    TokensCount,
    Place,
    IntegerSum,
    IntegerProduct,
    IntegerDifference,
    Other(String),
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        match value {
            TAG_PROPERTY_SET => Tag::PropertySet,
            TAG_PROPERTY => Tag::Property,
            TAG_ID => Tag::Id,
            TAG_FORMULA => Tag::Formula,
            TAG_TAGS => Tag::Tags,
            TAG_IS_REACHABILITY => Tag::IsReachability,
            TAG_SMC => Tag::Smc,
            TAG_OBSERVATIONS => Tag::Observations,
            TAG_WATCH => Tag::Watch,
            TAG_K_SAFE => Tag::KSafe,
            TAG_CONTROL => Tag::Control,
            TAG_INVARIANT => Tag::Invariant,
            TAG_IMPOSSIBILITY => Tag::Impossibility,
            TAG_POSSIBILITY => Tag::Possibility,
            TAG_EXISTS_PATH => Tag::ExistsPath,
            TAG_ALL_PATHS => Tag::AllPaths,
            TAG_NEXT => Tag::Next,
            TAG_GLOBALLY => Tag::Globally,
            TAG_FINALLY => Tag::Finally,
            TAG_UNTIL => Tag::Until,
            TAG_BEFORE => Tag::Before,
            TAG_REACH => Tag::Reach,
            TAG_DEADLOCK => Tag::Deadlock,
            TAG_TRUE => Tag::True,
            TAG_FALSE => Tag::False,
            TAG_NEGATION => Tag::Negation,
            TAG_CONJUNCTION => Tag::Conjunction,
            TAG_DISJUNCTION => Tag::Disjunction,
            TAG_EXCLUSIVE_DISJUNCTION => Tag::ExclusiveDisjunction,
            TAG_IMPLICATION => Tag::Implication,
            TAG_EQUIVALENCE => Tag::Equivalence,
            TAG_INTEGER_EQ => Tag::IntegerEq,
            TAG_INTEGER_NE => Tag::IntegerNe,
            TAG_INTEGER_LT => Tag::IntegerLt,
            TAG_INTEGER_LE => Tag::IntegerLe,
            TAG_INTEGER_GT => Tag::IntegerGt,
            TAG_INTEGER_GE => Tag::IntegerGe,
            TAG_INTEGER_CONSTANT => Tag::IntegerConstant,
            TAG_TOKENS_COUNT => Tag::TokensCount,
            TAG_PLACE => Tag::Place,
            TAG_INTEGER_SUM => Tag::IntegerSum,
            TAG_INTEGER_PRODUCT => Tag::IntegerProduct,
            TAG_INTEGER_DIFFERENCE => Tag::IntegerDifference,
            other => Tag::Other(other.to_owned()),
        }
    }
}

impl Tag {
    /// The element name the tag was read from.
    pub fn name(&self) -> &str {
        match self {
            Tag::PropertySet => TAG_PROPERTY_SET,
            Tag::Property => TAG_PROPERTY,
            Tag::Id => TAG_ID,
            Tag::Formula => TAG_FORMULA,
            Tag::Tags => TAG_TAGS,
            Tag::IsReachability => TAG_IS_REACHABILITY,
            Tag::Smc => TAG_SMC,
            Tag::Observations => TAG_OBSERVATIONS,
            Tag::Watch => TAG_WATCH,
            Tag::KSafe => TAG_K_SAFE,
            Tag::Control => TAG_CONTROL,
            Tag::Invariant => TAG_INVARIANT,
            Tag::Impossibility => TAG_IMPOSSIBILITY,
            Tag::Possibility => TAG_POSSIBILITY,
            Tag::ExistsPath => TAG_EXISTS_PATH,
            Tag::AllPaths => TAG_ALL_PATHS,
            Tag::Next => TAG_NEXT,
            Tag::Globally => TAG_GLOBALLY,
            Tag::Finally => TAG_FINALLY,
            Tag::Until => TAG_UNTIL,
            Tag::Before => TAG_BEFORE,
            Tag::Reach => TAG_REACH,
            Tag::Deadlock => TAG_DEADLOCK,
            Tag::True => TAG_TRUE,
            Tag::False => TAG_FALSE,
            Tag::Negation => TAG_NEGATION,
            Tag::Conjunction => TAG_CONJUNCTION,
            Tag::Disjunction => TAG_DISJUNCTION,
            Tag::ExclusiveDisjunction => TAG_EXCLUSIVE_DISJUNCTION,
            Tag::Implication => TAG_IMPLICATION,
            Tag::Equivalence => TAG_EQUIVALENCE,
            Tag::IntegerEq => TAG_INTEGER_EQ,
            Tag::IntegerNe => TAG_INTEGER_NE,
            Tag::IntegerLt => TAG_INTEGER_LT,
            Tag::IntegerLe => TAG_INTEGER_LE,
            Tag::IntegerGt => TAG_INTEGER_GT,
            Tag::IntegerGe => TAG_INTEGER_GE,
            Tag::IntegerConstant => TAG_INTEGER_CONSTANT,
            Tag::TokensCount => TAG_TOKENS_COUNT,
            Tag::Place => TAG_PLACE,
            Tag::IntegerSum => TAG_INTEGER_SUM,
            Tag::IntegerProduct => TAG_INTEGER_PRODUCT,
            Tag::IntegerDifference => TAG_INTEGER_DIFFERENCE,
            Tag::Other(name) => name,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An element of a query document.
///
/// Children are kept in document order.
/// The text is the concatenation of all the text and CDATA content directly inside the element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    tag: Tag,
    text: String,
    attributes: HashMap<String, String>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn open<R>(tag: &BytesStart<'_>, reader: &Reader<R>) -> anyhow::Result<Self> {
        let name = reader.decoder().decode(tag.name().into_inner())?;
        let mut attributes = HashMap::new();
        for attr in tag.attributes() {
            let attr = attr?;
            let key = reader.decoder().decode(attr.key.into_inner())?.into_owned();
            let val = attr.unescape_value()?.into_owned();
            attributes.insert(key, val);
        }
        Ok(XmlNode {
            tag: Tag::from(name.as_ref()),
            text: String::new(),
            attributes,
            children: Vec::new(),
        })
    }

    /// Reads a whole document into its root element.
    ///
    /// Fails if the document is not well-formed,
    /// has no or multiple root elements, or nests elements deeper than [`MAX_NESTING`].
    pub fn parse<R: BufRead>(reader: &mut Reader<R>) -> anyhow::Result<Self> {
        let mut buf = Vec::new();
        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;
        loop {
            match reader
                .read_event_into(&mut buf)
                .with_context(|| {
                    format!("failed reading event at byte {}", reader.error_position())
                })?
            {
                Event::Start(tag) => {
                    let node = XmlNode::open(&tag, reader)?;
                    trace!(target: "parser", "start tag '{}'", node.tag);
                    if root.is_some() && stack.is_empty() {
                        error!(target: "parser", "found element '{}' after the root element", node.tag);
                        bail!(ParserError::MultipleRoots);
                    }
                    if stack.len() >= MAX_NESTING {
                        error!(target: "parser", "element nesting exceeds {MAX_NESTING}");
                        bail!(ParserError::TooDeep(MAX_NESTING));
                    }
                    stack.push(node);
                }
                Event::End(tag) => {
                    let tag_name = &*reader.decoder().decode(tag.name().into_inner())?;
                    let node = stack
                        .pop()
                        .filter(|node| node.tag.name() == tag_name)
                        .ok_or_else(|| {
                            error!(target: "parser", "unknown or unexpected end tag '{tag_name}'");
                            anyhow!(ParserError::UnexpectedEndTag(tag_name.to_string()))
                        })?;
                    trace!(target: "parser", "end tag '{tag_name}'");
                    Self::close(node, &mut stack, &mut root)?;
                }
                Event::Empty(tag) => {
                    let node = XmlNode::open(&tag, reader)?;
                    trace!(target: "parser", "empty tag '{}'", node.tag);
                    Self::close(node, &mut stack, &mut root)?;
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&text);
                    } else if !text.trim().is_empty() {
                        error!(target: "parser", "text content outside of the root element");
                        bail!(ParserError::TextOutsideRoot);
                    }
                }
                Event::CData(data) => {
                    let text = reader.decoder().decode(&data)?;
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&text);
                    } else {
                        error!(target: "parser", "CData outside of the root element");
                        bail!(ParserError::TextOutsideRoot);
                    }
                }
                // Ignore comments
                Event::Comment(_)
                // Ignore XML declaration
                | Event::Decl(_) => {}
                Event::PI(_) => {
                    error!(target: "parser", "Processing Instructions not supported");
                    bail!("Processing Instructions not supported");
                }
                Event::DocType(_) => {
                    error!(target: "parser", "DocType not supported");
                    bail!("DocType not supported");
                }
                // exits the loop when reaching end of file
                Event::Eof => break,
            }
            // if we don't keep a borrow elsewhere, we can clear the buffer to keep memory usage low
            buf.clear();
        }
        if let Some(node) = stack.pop() {
            error!(target: "parser", "unclosed tag '{}'", node.tag);
            bail!(ParserError::UnclosedTags);
        }
        root.ok_or_else(|| anyhow!(ParserError::NoRoot))
    }

    fn close(
        node: XmlNode,
        stack: &mut [XmlNode],
        root: &mut Option<XmlNode>,
    ) -> anyhow::Result<()> {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(node);
        } else if root.is_none() {
            *root = Some(node);
        } else {
            error!(target: "parser", "found element '{}' after the root element", node.tag);
            bail!(ParserError::MultipleRoots);
        }
        Ok(())
    }

    /// The element's tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// The element's name.
    pub fn name(&self) -> &str {
        self.tag.name()
    }

    /// The raw text content of the element.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The value of the named attribute, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// The child elements, in document order.
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }
}

impl FromStr for XmlNode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        XmlNode::parse(&mut Reader::from_str(s))
    }
}
