//! Integer expressions over the marking of a Petri net.
//!
//! The type [`Expr`] encodes integer-valued terms:
//! literals, token counts of places, and n-ary arithmetic.

use serde::Serialize;
use std::{collections::BTreeSet, fmt};

/// Integer values.
pub type Integer = i32;

/// Integer expressions over place markings.
///
/// Operand lists of [`Expr::Plus`], [`Expr::Multiply`] and [`Expr::Subtract`]
/// keep the order in which operands appear in the source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Expr {
    /// An integer constant.
    Literal(Integer),
    /// The number of tokens in the named place.
    Identifier(String),
    /// n-ary sum.
    Plus(Vec<Expr>),
    /// n-ary product.
    Multiply(Vec<Expr>),
    /// Left-to-right subtraction chain: the first operand minus all the following ones.
    Subtract(Vec<Expr>),
}

impl Expr {
    /// Token count of a single place.
    pub fn place(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    /// Names of the places referenced by the expression.
    pub fn places(&self) -> BTreeSet<&str> {
        let mut places = BTreeSet::new();
        self.collect_places(&mut places);
        places
    }

    pub(crate) fn collect_places<'a>(&'a self, places: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Identifier(place) => {
                places.insert(place.as_str());
            }
            Expr::Plus(exprs) | Expr::Multiply(exprs) | Expr::Subtract(exprs) => {
                exprs.iter().for_each(|expr| expr.collect_places(places));
            }
        }
    }
}

impl From<Integer> for Expr {
    fn from(value: Integer) -> Self {
        Expr::Literal(value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (exprs, op) = match self {
            Expr::Literal(val) => return write!(f, "{val}"),
            Expr::Identifier(place) => return write!(f, "{place}"),
            Expr::Plus(exprs) => (exprs, " + "),
            Expr::Multiply(exprs) => (exprs, " * "),
            Expr::Subtract(exprs) => (exprs, " - "),
        };
        write!(f, "(")?;
        for (idx, expr) in exprs.iter().enumerate() {
            if idx > 0 {
                write!(f, "{op}")?;
            }
            write!(f, "{expr}")?;
        }
        write!(f, ")")
    }
}
