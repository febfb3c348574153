//! Boolean and temporal formulae.
//!
//! Derived operators are rewritten into the primitive ones:
//!
//! - INV φ = AG φ = ¬EF ¬φ
//! - IMPOS φ = AG ¬φ = ¬EF φ
//! - POS φ = EF φ
//! - NEG INV φ = ¬AG φ = EF ¬φ
//! - NEG IMPOS φ = ¬AG ¬φ = EF φ
//! - NEG POS φ = ¬EF φ

use super::{
    Expected, ParserError, QueryParser, Tag, XmlNode, expect_children, only_child, unexpected,
};
use anyhow::bail;
use log::error;
use pql_core::{Condition, Probability, SmcSettings};

#[derive(Debug, Clone, Copy)]
enum Quantifier {
    Exists,
    All,
}

impl QueryParser {
    /// Parses the content of a `formula` element.
    ///
    /// Global properties are kept as macro conditions, and unfolded by the engine.
    pub(super) fn parse_formula(&self, node: &XmlNode) -> anyhow::Result<Condition> {
        let child = only_child(node)?;
        match child.tag() {
            Tag::KSafe => {
                let bound = self.parse_integer_expression(only_child(child)?, 0)?;
                Ok(Condition::KSafe(bound))
            }
            Tag::Control => {
                let cond = self.parse_boolean_formula(only_child(child)?, 0)?;
                Ok(Condition::Control(Box::new(cond)))
            }
            _ => self.parse_boolean_formula(child, 0),
        }
    }

    /// Parses the content of the `formula` element of a statistical query.
    pub(super) fn parse_smc_formula(
        &self,
        settings: SmcSettings,
        node: &XmlNode,
    ) -> anyhow::Result<Condition> {
        let child = only_child(node)?;
        let wrap: fn(Box<Probability>) -> Condition = match child.tag() {
            Tag::Finally => Condition::ProbabilityFinally,
            Tag::Globally => Condition::ProbabilityGlobally,
            _ => return Err(unexpected(child, "statistical formula")),
        };
        let condition = self.parse_boolean_formula(only_child(child)?, 0)?;
        Ok(wrap(Box::new(Probability {
            settings,
            condition,
            observables: Vec::new(),
        })))
    }

    pub(super) fn parse_boolean_formula(
        &self,
        node: &XmlNode,
        depth: usize,
    ) -> anyhow::Result<Condition> {
        let depth = self.descend(depth)?;
        match node.tag() {
            Tag::Invariant => {
                let cond = self.parse_boolean_formula(only_child(node)?, depth)?;
                Ok(!(!cond).ef())
            }
            Tag::Impossibility => {
                let cond = self.parse_boolean_formula(only_child(node)?, depth)?;
                Ok(!cond.ef())
            }
            Tag::Possibility => {
                let cond = self.parse_boolean_formula(only_child(node)?, depth)?;
                Ok(cond.ef())
            }
            Tag::ExistsPath => self.parse_path_formula(node, Quantifier::Exists, depth),
            Tag::AllPaths => self.parse_path_formula(node, Quantifier::All, depth),
            Tag::Deadlock => {
                expect_children(node, Expected::Exactly(0))?;
                Ok(Condition::Deadlock)
            }
            Tag::True => {
                expect_children(node, Expected::Exactly(0))?;
                Ok(Condition::TRUE)
            }
            Tag::False => {
                expect_children(node, Expected::Exactly(0))?;
                Ok(Condition::FALSE)
            }
            Tag::Negation => self.parse_negation(node, depth),
            Tag::Conjunction => self.parse_fold(node, depth, Condition::and),
            Tag::Disjunction => self.parse_fold(node, depth, Condition::or),
            Tag::ExclusiveDisjunction => {
                let (lhs, rhs) = self.parse_pair(node, depth)?;
                Ok(lhs.clone().and(!rhs.clone()).or((!lhs).and(rhs)))
            }
            Tag::Implication => {
                let (lhs, rhs) = self.parse_pair(node, depth)?;
                Ok((!lhs).or(rhs))
            }
            Tag::Equivalence => {
                let (lhs, rhs) = self.parse_pair(node, depth)?;
                Ok(lhs.clone().and(rhs.clone()).or((!lhs).and(!rhs)))
            }
            Tag::IntegerEq
            | Tag::IntegerNe
            | Tag::IntegerLt
            | Tag::IntegerLe
            | Tag::IntegerGt
            | Tag::IntegerGe => self.parse_comparison(node, depth),
            _ => Err(unexpected(node, "boolean formula")),
        }
    }

    // Negation of a reachability formula is pushed inside the EF.
    fn parse_negation(&self, node: &XmlNode, depth: usize) -> anyhow::Result<Condition> {
        let child = only_child(node)?;
        match child.tag() {
            Tag::Invariant => {
                let cond = self.parse_boolean_formula(only_child(child)?, depth)?;
                Ok((!cond).ef())
            }
            Tag::Impossibility => {
                let cond = self.parse_boolean_formula(only_child(child)?, depth)?;
                Ok(cond.ef())
            }
            Tag::Possibility => {
                let cond = self.parse_boolean_formula(only_child(child)?, depth)?;
                Ok(!cond.ef())
            }
            _ => {
                let cond = self.parse_boolean_formula(child, depth)?;
                Ok(!cond)
            }
        }
    }

    fn parse_path_formula(
        &self,
        node: &XmlNode,
        quantifier: Quantifier,
        depth: usize,
    ) -> anyhow::Result<Condition> {
        let modality = only_child(node)?;
        match modality.tag() {
            Tag::Next => {
                let cond = self.parse_boolean_formula(only_child(modality)?, depth)?;
                Ok(match quantifier {
                    Quantifier::Exists => cond.ex(),
                    Quantifier::All => cond.ax(),
                })
            }
            Tag::Globally => {
                let cond = self.parse_boolean_formula(only_child(modality)?, depth)?;
                Ok(match quantifier {
                    Quantifier::Exists => cond.eg(),
                    Quantifier::All => cond.ag(),
                })
            }
            Tag::Finally => {
                let cond = self.parse_boolean_formula(only_child(modality)?, depth)?;
                Ok(match quantifier {
                    Quantifier::Exists => cond.ef(),
                    Quantifier::All => cond.af(),
                })
            }
            Tag::Until => {
                let children = expect_children(modality, Expected::Exactly(2))?;
                let (before, reach) = (&children[0], &children[1]);
                if *before.tag() != Tag::Before || *reach.tag() != Tag::Reach {
                    error!(target: "parser", "'until' requires 'before' and 'reach', found '{}' and '{}'", before.tag(), reach.tag());
                    bail!(ParserError::UntilOperands(
                        before.name().to_owned(),
                        reach.name().to_owned()
                    ));
                }
                let lhs = self.parse_boolean_formula(only_child(before)?, depth)?;
                let rhs = self.parse_boolean_formula(only_child(reach)?, depth)?;
                Ok(match quantifier {
                    Quantifier::Exists => lhs.eu(rhs),
                    Quantifier::All => lhs.au(rhs),
                })
            }
            _ => Err(unexpected(modality, "path formula")),
        }
    }

    // Left fold: `op(op(c1, c2), c3)`.
    fn parse_fold(
        &self,
        node: &XmlNode,
        depth: usize,
        op: fn(Condition, Condition) -> Condition,
    ) -> anyhow::Result<Condition> {
        let children = expect_children(node, Expected::AtLeast(2))?;
        let mut cond = self.parse_boolean_formula(&children[0], depth)?;
        for child in &children[1..] {
            cond = op(cond, self.parse_boolean_formula(child, depth)?);
        }
        Ok(cond)
    }

    fn parse_pair(&self, node: &XmlNode, depth: usize) -> anyhow::Result<(Condition, Condition)> {
        let children = expect_children(node, Expected::Exactly(2))?;
        let lhs = self.parse_boolean_formula(&children[0], depth)?;
        let rhs = self.parse_boolean_formula(&children[1], depth)?;
        Ok((lhs, rhs))
    }

    // `integer-gt` and `integer-ge` swap their operands onto `LessThan` and `LessThanOrEqual`.
    fn parse_comparison(&self, node: &XmlNode, depth: usize) -> anyhow::Result<Condition> {
        let children = expect_children(node, Expected::Exactly(2))?;
        let lhs = self.parse_integer_expression(&children[0], depth)?;
        let rhs = self.parse_integer_expression(&children[1], depth)?;
        match node.tag() {
            Tag::IntegerEq => Ok(Condition::Equal(Box::new((lhs, rhs)))),
            Tag::IntegerNe => Ok(Condition::NotEqual(Box::new((lhs, rhs)))),
            Tag::IntegerLt => Ok(Condition::LessThan(Box::new((lhs, rhs)))),
            Tag::IntegerLe => Ok(Condition::LessThanOrEqual(Box::new((lhs, rhs)))),
            Tag::IntegerGt => Ok(Condition::LessThan(Box::new((rhs, lhs)))),
            Tag::IntegerGe => Ok(Condition::LessThanOrEqual(Box::new((rhs, lhs)))),
            _ => Err(unexpected(node, "comparison")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pql_core::Expr;
    use std::str::FromStr;

    fn formula(xml: &str) -> anyhow::Result<Condition> {
        let node = XmlNode::from_str(xml)?;
        QueryParser::default().parse_boolean_formula(&node, 0)
    }

    fn root(xml: &str) -> anyhow::Result<Condition> {
        let node = XmlNode::from_str(&format!("<formula>{xml}</formula>"))?;
        QueryParser::default().parse_formula(&node)
    }

    fn parser_error(err: &anyhow::Error) -> &ParserError {
        err.root_cause()
            .downcast_ref::<ParserError>()
            .expect("parser error")
    }

    fn le(place: &str, val: i32) -> Condition {
        Condition::LessThanOrEqual(Box::new((Expr::place(place), Expr::Literal(val))))
    }

    const PHI: &str = "<integer-le><place>p</place><integer-constant>3</integer-constant></integer-le>";

    #[test]
    fn invariant_true() -> anyhow::Result<()> {
        assert_eq!(
            formula("<invariant><true/></invariant>")?,
            !(!Condition::TRUE).ef()
        );
        Ok(())
    }

    #[test]
    fn impossibility_and_possibility() -> anyhow::Result<()> {
        assert_eq!(
            formula(&format!("<impossibility>{PHI}</impossibility>"))?,
            !le("p", 3).ef()
        );
        assert_eq!(
            formula(&format!("<possibility>{PHI}</possibility>"))?,
            le("p", 3).ef()
        );
        Ok(())
    }

    #[test]
    fn negated_reachability() -> anyhow::Result<()> {
        let negated_invariant =
            formula(&format!("<negation><invariant>{PHI}</invariant></negation>"))?;
        assert_eq!(negated_invariant, (!le("p", 3)).ef());
        assert_eq!(
            negated_invariant,
            formula(&format!("<possibility><negation>{PHI}</negation></possibility>"))?
        );
        assert_eq!(
            formula(&format!("<negation><impossibility>{PHI}</impossibility></negation>"))?,
            le("p", 3).ef()
        );
        assert_eq!(
            formula(&format!("<negation><possibility>{PHI}</possibility></negation>"))?,
            formula(&format!("<impossibility>{PHI}</impossibility>"))?
        );
        Ok(())
    }

    #[test]
    fn double_negation_is_kept() -> anyhow::Result<()> {
        assert_eq!(
            formula("<negation><negation><deadlock/></negation></negation>")?,
            !!Condition::Deadlock
        );
        Ok(())
    }

    #[test]
    fn path_formulae() -> anyhow::Result<()> {
        let cases = [
            ("exists-path", "next", Condition::Deadlock.ex()),
            ("exists-path", "globally", Condition::Deadlock.eg()),
            ("exists-path", "finally", Condition::Deadlock.ef()),
            ("all-paths", "next", Condition::Deadlock.ax()),
            ("all-paths", "globally", Condition::Deadlock.ag()),
            ("all-paths", "finally", Condition::Deadlock.af()),
        ];
        for (quantifier, modality, expected) in cases {
            let xml = format!("<{quantifier}><{modality}><deadlock/></{modality}></{quantifier}>");
            assert_eq!(formula(&xml)?, expected, "{xml}");
        }
        Ok(())
    }

    #[test]
    fn until() -> anyhow::Result<()> {
        let eu = formula(&format!(
            "<exists-path><until><before><true/></before><reach>{PHI}</reach></until></exists-path>"
        ))?;
        assert_eq!(eu, Condition::TRUE.eu(le("p", 3)));
        let au = formula(&format!(
            "<all-paths><until><before>{PHI}</before><reach><deadlock/></reach></until></all-paths>"
        ))?;
        assert_eq!(au, le("p", 3).au(Condition::Deadlock));
        Ok(())
    }

    #[test]
    fn until_operands_in_order() {
        let err = formula(
            "<exists-path><until><reach><true/></reach><before><true/></before></until></exists-path>",
        )
        .unwrap_err();
        assert!(matches!(
            parser_error(&err),
            ParserError::UntilOperands(before, reach) if before == "reach" && reach == "before"
        ));
    }

    #[test]
    fn until_operand_arity() {
        let err = formula(
            "<all-paths><until><before><true/><false/></before><reach><true/></reach></until></all-paths>",
        )
        .unwrap_err();
        assert!(matches!(
            parser_error(&err),
            ParserError::WrongArity { tag, found: 2, .. } if tag == "before"
        ));
    }

    #[test]
    fn path_requires_modality() {
        let err = formula("<exists-path><deadlock/></exists-path>").unwrap_err();
        assert!(matches!(
            parser_error(&err),
            ParserError::UnexpectedTag { tag, context: "path formula" } if tag == "deadlock"
        ));
    }

    #[test]
    fn conjunction_arity() {
        for xml in ["<conjunction/>", "<conjunction><true/></conjunction>"] {
            let err = formula(xml).unwrap_err();
            assert!(matches!(
                parser_error(&err),
                ParserError::WrongArity {
                    expected: Expected::AtLeast(2),
                    ..
                }
            ));
        }
    }

    #[test]
    fn conjunction_left_fold() -> anyhow::Result<()> {
        let cond = formula("<conjunction><true/><false/><deadlock/></conjunction>")?;
        assert_eq!(
            cond,
            Condition::TRUE
                .and(Condition::FALSE)
                .and(Condition::Deadlock)
        );
        if let Condition::And(args) = &cond {
            assert!(matches!(args.0, Condition::And(_)));
            assert!(matches!(args.1, Condition::Deadlock));
        } else {
            unreachable!();
        }
        Ok(())
    }

    #[test]
    fn disjunction_left_fold() -> anyhow::Result<()> {
        assert_eq!(
            formula("<disjunction><true/><false/><deadlock/><true/></disjunction>")?,
            Condition::TRUE
                .or(Condition::FALSE)
                .or(Condition::Deadlock)
                .or(Condition::TRUE)
        );
        Ok(())
    }

    #[test]
    fn derived_connectives() -> anyhow::Result<()> {
        let a = Condition::Deadlock;
        let b = le("p", 3);
        assert_eq!(
            formula(&format!("<exclusive-disjunction><deadlock/>{PHI}</exclusive-disjunction>"))?,
            a.clone().and(!b.clone()).or((!a.clone()).and(b.clone()))
        );
        assert_eq!(
            formula(&format!("<implication><deadlock/>{PHI}</implication>"))?,
            (!a.clone()).or(b.clone())
        );
        assert_eq!(
            formula(&format!("<equivalence><deadlock/>{PHI}</equivalence>"))?,
            a.clone().and(b.clone()).or((!a).and(!b))
        );
        Ok(())
    }

    #[test]
    fn binary_connectives_arity() {
        for tag in ["exclusive-disjunction", "implication", "equivalence"] {
            let err = formula(&format!("<{tag}><true/><true/><true/></{tag}>")).unwrap_err();
            assert!(matches!(
                parser_error(&err),
                ParserError::WrongArity { expected: Expected::Exactly(2), found: 3, .. }
            ));
        }
    }

    #[test]
    fn comparisons() -> anyhow::Result<()> {
        let e1 = "<place>p1</place>";
        let e2 = "<integer-constant>2</integer-constant>";
        let (p1, two) = (Expr::place("p1"), Expr::Literal(2));
        let cases = [
            ("integer-eq", Condition::Equal(Box::new((p1.clone(), two.clone())))),
            ("integer-ne", Condition::NotEqual(Box::new((p1.clone(), two.clone())))),
            ("integer-lt", Condition::LessThan(Box::new((p1.clone(), two.clone())))),
            ("integer-le", Condition::LessThanOrEqual(Box::new((p1.clone(), two.clone())))),
            ("integer-gt", Condition::LessThan(Box::new((two.clone(), p1.clone())))),
            ("integer-ge", Condition::LessThanOrEqual(Box::new((two.clone(), p1.clone())))),
        ];
        for (tag, expected) in cases {
            assert_eq!(formula(&format!("<{tag}>{e1}{e2}</{tag}>"))?, expected, "{tag}");
        }
        Ok(())
    }

    #[test]
    fn greater_than_swaps_operands() -> anyhow::Result<()> {
        let e1 = "<tokens-count><place>a</place><place>b</place></tokens-count>";
        let e2 = "<integer-constant>7</integer-constant>";
        assert_eq!(
            formula(&format!("<integer-gt>{e1}{e2}</integer-gt>"))?,
            formula(&format!("<integer-lt>{e2}{e1}</integer-lt>"))?
        );
        Ok(())
    }

    #[test]
    fn comparison_of_formulae() {
        let err = formula("<integer-eq><true/><true/></integer-eq>").unwrap_err();
        assert!(matches!(
            parser_error(&err),
            ParserError::UnexpectedTag { context: "integer expression", .. }
        ));
    }

    #[test]
    fn unknown_tag() {
        let err = formula("<is-fireable><transition>t0</transition></is-fireable>").unwrap_err();
        assert!(matches!(
            parser_error(&err),
            ParserError::UnexpectedTag { tag, context: "boolean formula" } if tag == "is-fireable"
        ));
    }

    #[test]
    fn deadlock_is_a_leaf() {
        let err = formula("<deadlock><true/></deadlock>").unwrap_err();
        assert!(matches!(
            parser_error(&err),
            ParserError::WrongArity { found: 1, .. }
        ));
    }

    #[test]
    fn k_safe() -> anyhow::Result<()> {
        assert_eq!(
            root("<k-safe><integer-constant>3</integer-constant></k-safe>")?,
            Condition::KSafe(Expr::Literal(3))
        );
        let err = root("<k-safe><integer-constant>3</integer-constant><place>p</place></k-safe>")
            .unwrap_err();
        assert!(matches!(parser_error(&err), ParserError::WrongArity { .. }));
        let err = root("<k-safe/>").unwrap_err();
        assert!(matches!(parser_error(&err), ParserError::WrongArity { found: 0, .. }));
        Ok(())
    }

    #[test]
    fn control() -> anyhow::Result<()> {
        assert_eq!(
            root("<control><all-paths><globally><true/></globally></all-paths></control>")?,
            Condition::Control(Box::new(Condition::TRUE.ag()))
        );
        Ok(())
    }

    #[test]
    fn formula_requires_single_child() {
        let err = root("<true/><false/>").unwrap_err();
        assert!(matches!(
            parser_error(&err),
            ParserError::WrongArity { tag, .. } if tag == "formula"
        ));
        assert!(root("").is_err());
    }

    #[test]
    fn smc_formulae() -> anyhow::Result<()> {
        let parser = QueryParser::default();
        let settings = SmcSettings {
            step_bound: 20,
            ..Default::default()
        };
        let node = XmlNode::from_str("<formula><globally><deadlock/></globally></formula>")?;
        let cond = parser.parse_smc_formula(settings, &node)?;
        assert_eq!(
            cond,
            Condition::ProbabilityGlobally(Box::new(Probability {
                settings,
                condition: Condition::Deadlock,
                observables: Vec::new(),
            }))
        );
        let node = XmlNode::from_str("<formula><next><deadlock/></next></formula>")?;
        let err = parser.parse_smc_formula(settings, &node).unwrap_err();
        assert!(matches!(
            parser_error(&err),
            ParserError::UnexpectedTag { context: "statistical formula", .. }
        ));
        Ok(())
    }
}
