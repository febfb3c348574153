use super::{Expected, ParserError, QueryParser, Tag, XmlNode, expect_children, unexpected};
use anyhow::bail;
use log::error;
use pql_core::{Expr, Integer};

impl QueryParser {
    pub(super) fn parse_integer_expression(
        &self,
        node: &XmlNode,
        depth: usize,
    ) -> anyhow::Result<Expr> {
        let depth = self.descend(depth)?;
        match node.tag() {
            Tag::IntegerConstant => {
                let text = node.text().trim();
                let val = text.parse::<Integer>().map_err(|err| {
                    error!(target: "parser", "invalid integer constant '{text}': {err}");
                    ParserError::InvalidInteger(text.to_owned())
                })?;
                Ok(Expr::Literal(val))
            }
            Tag::TokensCount => {
                let mut places = expect_children(node, Expected::AtLeast(1))?
                    .iter()
                    .map(|place| {
                        if *place.tag() != Tag::Place {
                            return Err(unexpected(place, "tokens-count"));
                        }
                        let name = parse_place(place);
                        if name.is_empty() {
                            error!(target: "parser", "place with empty name in tokens-count");
                            bail!(ParserError::EmptyPlace);
                        }
                        Ok(Expr::Identifier(name))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                if places.len() == 1 {
                    Ok(places.remove(0))
                } else {
                    Ok(Expr::Plus(places))
                }
            }
            Tag::Place => {
                let name = parse_place(node);
                if name.is_empty() {
                    error!(target: "parser", "place with empty name");
                    bail!(ParserError::EmptyPlace);
                }
                Ok(Expr::Identifier(name))
            }
            Tag::IntegerSum => Ok(Expr::Plus(self.parse_operands(node, 2, depth)?)),
            Tag::IntegerProduct => Ok(Expr::Multiply(self.parse_operands(node, 2, depth)?)),
            Tag::IntegerDifference => {
                let mut operands = self.parse_operands(node, 1, depth)?;
                // Unary difference is negation.
                if operands.len() == 1 {
                    operands.insert(0, Expr::Literal(0));
                }
                Ok(Expr::Subtract(operands))
            }
            _ => Err(unexpected(node, "integer expression")),
        }
    }

    fn parse_operands(
        &self,
        node: &XmlNode,
        min: usize,
        depth: usize,
    ) -> anyhow::Result<Vec<Expr>> {
        let children = expect_children(node, Expected::AtLeast(min))?;
        let mut operands = Vec::with_capacity(children.len());
        for child in children {
            operands.push(self.parse_integer_expression(child, depth)?);
        }
        Ok(operands)
    }
}

/// The name of a `place` element with all whitespace removed,
/// or the empty string if `node` is not a `place`.
pub fn parse_place(node: &XmlNode) -> String {
    if *node.tag() != Tag::Place {
        return String::new();
    }
    node.text().chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn expression(xml: &str) -> anyhow::Result<Expr> {
        let node = XmlNode::from_str(xml)?;
        QueryParser::default().parse_integer_expression(&node, 0)
    }

    fn parser_error(err: &anyhow::Error) -> &ParserError {
        err.root_cause()
            .downcast_ref::<ParserError>()
            .expect("parser error")
    }

    #[test]
    fn place_name_is_stripped() -> anyhow::Result<()> {
        assert_eq!(parse_place(&XmlNode::from_str("<place> p1 </place>")?), "p1");
        assert_eq!(parse_place(&XmlNode::from_str("<place>\n\tp 2\n</place>")?), "p2");
        assert_eq!(parse_place(&XmlNode::from_str("<transition>t1</transition>")?), "");
        Ok(())
    }

    #[test]
    fn constants() -> anyhow::Result<()> {
        assert_eq!(
            expression("<integer-constant> 42 </integer-constant>")?,
            Expr::Literal(42)
        );
        assert_eq!(
            expression("<integer-constant>-3</integer-constant>")?,
            Expr::Literal(-3)
        );
        for text in ["4x", "", "99999999999"] {
            let err = expression(&format!("<integer-constant>{text}</integer-constant>"))
                .unwrap_err();
            assert!(matches!(
                parser_error(&err),
                ParserError::InvalidInteger(found) if found == text
            ));
        }
        Ok(())
    }

    #[test]
    fn tokens_count() -> anyhow::Result<()> {
        assert_eq!(
            expression("<tokens-count><place>p1</place></tokens-count>")?,
            Expr::place("p1")
        );
        assert_eq!(
            expression("<tokens-count><place>p1</place><place> p2</place></tokens-count>")?,
            Expr::Plus(vec![Expr::place("p1"), Expr::place("p2")])
        );
        let err = expression("<tokens-count/>").unwrap_err();
        assert!(matches!(
            parser_error(&err),
            ParserError::WrongArity { found: 0, .. }
        ));
        let err = expression("<tokens-count><place> </place></tokens-count>").unwrap_err();
        assert!(matches!(parser_error(&err), ParserError::EmptyPlace));
        let err = expression(
            "<tokens-count><integer-constant>1</integer-constant></tokens-count>",
        )
        .unwrap_err();
        assert!(matches!(
            parser_error(&err),
            ParserError::UnexpectedTag { context: "tokens-count", .. }
        ));
        Ok(())
    }

    #[test]
    fn sum_and_product() -> anyhow::Result<()> {
        assert_eq!(
            expression(
                "<integer-sum><place>a</place><integer-constant>1</integer-constant><place>b</place></integer-sum>"
            )?,
            Expr::Plus(vec![Expr::place("a"), Expr::Literal(1), Expr::place("b")])
        );
        assert_eq!(
            expression(
                "<integer-product><integer-constant>2</integer-constant><integer-sum><place>a</place><place>b</place></integer-sum></integer-product>"
            )?,
            Expr::Multiply(vec![
                Expr::Literal(2),
                Expr::Plus(vec![Expr::place("a"), Expr::place("b")])
            ])
        );
        let err = expression("<integer-sum><place>a</place></integer-sum>").unwrap_err();
        assert!(matches!(
            parser_error(&err),
            ParserError::WrongArity { expected: Expected::AtLeast(2), found: 1, .. }
        ));
        Ok(())
    }

    #[test]
    fn difference() -> anyhow::Result<()> {
        assert_eq!(
            expression("<integer-difference><place>a</place></integer-difference>")?,
            Expr::Subtract(vec![Expr::Literal(0), Expr::place("a")])
        );
        assert_eq!(
            expression(
                "<integer-difference><place>a</place><place>b</place></integer-difference>"
            )?,
            Expr::Subtract(vec![Expr::place("a"), Expr::place("b")])
        );
        assert!(expression("<integer-difference/>").is_err());
        Ok(())
    }

    #[test]
    fn formula_is_not_an_expression() {
        let err = expression("<deadlock/>").unwrap_err();
        assert!(matches!(
            parser_error(&err),
            ParserError::UnexpectedTag { tag, context: "integer expression" } if tag == "deadlock"
        ));
    }
}
