use super::vocabulary::*;
use super::{ParserError, QueryParser, Tag, XmlNode, only_child};
use anyhow::anyhow;
use log::{debug, error, warn};
use pql_core::{Observable, SmcSettings};
use std::str::FromStr;

/// Reads the optional attribute `attr` of `node`.
fn attribute<T: FromStr>(node: &XmlNode, attr: &'static str) -> anyhow::Result<Option<T>> {
    node.attribute(attr)
        .map(|value| {
            value.trim().parse::<T>().map_err(|_| {
                error!(target: "parser", "invalid value '{value}' for attribute '{attr}'");
                anyhow!(ParserError::InvalidAttr {
                    attr,
                    value: value.to_owned(),
                })
            })
        })
        .transpose()
}

/// Settings of a statistical query from the attributes of its `smc` element.
/// Missing attributes keep their default value.
pub(super) fn parse_smc_settings(node: &XmlNode) -> anyhow::Result<SmcSettings> {
    let mut settings = SmcSettings::default();
    if let Some(bound) = attribute(node, ATTR_TIME_BOUND)? {
        settings.time_bound = bound;
    }
    if let Some(bound) = attribute(node, ATTR_STEP_BOUND)? {
        settings.step_bound = bound;
    }
    if let Some(alpha) = attribute(node, ATTR_FALSE_POSITIVES)? {
        settings.false_positives = alpha;
    }
    if let Some(beta) = attribute(node, ATTR_FALSE_NEGATIVES)? {
        settings.false_negatives = beta;
    }
    if let Some(delta) = attribute(node, ATTR_INDIFFERENCE)? {
        settings.indifference_region_up = delta;
        settings.indifference_region_down = delta;
    }
    if let Some(confidence) = attribute(node, ATTR_CONFIDENCE)? {
        settings.confidence = confidence;
    }
    if let Some(width) = attribute(node, ATTR_INTERVAL_WIDTH)? {
        settings.estimation_interval_width = width;
    }
    if let Some(threshold) = attribute(node, ATTR_COMPARE_TO)? {
        settings.compare_to_float = true;
        settings.geq_than = threshold;
    }
    debug!(target: "parser", "SMC settings: {settings:?}");
    Ok(settings)
}

impl QueryParser {
    /// Parses the `watch` children of an `observations` element.
    /// Other children, and watches with no name, are ignored.
    pub(super) fn parse_observables(&self, node: &XmlNode) -> anyhow::Result<Vec<Observable>> {
        let mut observables = Vec::new();
        for watch in node.children().iter().filter(|child| *child.tag() == Tag::Watch) {
            let Some(name) = watch.attribute(ATTR_NAME) else {
                warn!(target: "parser", "ignoring observable with no name");
                continue;
            };
            let expr = self.parse_integer_expression(only_child(watch)?, 0)?;
            observables.push((name.to_owned(), expr));
        }
        Ok(observables)
    }
}
