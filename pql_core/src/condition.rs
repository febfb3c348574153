//! Query conditions: CTL formulae over Petri net markings.
//!
//! Derived connectives (implication, equivalence, exclusive disjunction)
//! and derived modalities (invariant, impossibility) are not part of [`Condition`]:
//! they are expressed through the primitive operators.

use crate::{Expr, Observable, SmcSettings};
use serde::Serialize;
use std::{collections::BTreeSet, fmt, ops::Not};

/// Formula of a statistical query, together with its settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Probability {
    /// Settings of the statistical test.
    pub settings: SmcSettings,
    /// The path formula's argument.
    pub condition: Condition,
    /// Expressions recorded along the sampled runs.
    pub observables: Vec<Observable>,
}

/// Query conditions.
///
/// Each node owns its subformulae.
/// Binary operators store their operands as a boxed pair, `(lhs, rhs)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Condition {
    /// Boolean constant, see [`Condition::TRUE`] and [`Condition::FALSE`].
    Boolean(bool),
    /// The marking enables no transition.
    Deadlock,
    /// Negation.
    Not(Box<Condition>),
    /// Binary conjunction.
    And(Box<(Condition, Condition)>),
    /// Binary disjunction.
    Or(Box<(Condition, Condition)>),
    /// `lhs == rhs`.
    Equal(Box<(Expr, Expr)>),
    /// `lhs != rhs`.
    NotEqual(Box<(Expr, Expr)>),
    /// `lhs < rhs`.
    LessThan(Box<(Expr, Expr)>),
    /// `lhs <= rhs`.
    LessThanOrEqual(Box<(Expr, Expr)>),
    /// EX: some successor satisfies the formula.
    ExistsNext(Box<Condition>),
    /// EG: along some path the formula always holds.
    ExistsGlobally(Box<Condition>),
    /// EF: along some path the formula eventually holds.
    ExistsFinally(Box<Condition>),
    /// EU: along some path `lhs` holds until `rhs` does.
    ExistsUntil(Box<(Condition, Condition)>),
    /// AX: every successor satisfies the formula.
    AllNext(Box<Condition>),
    /// AG: along every path the formula always holds.
    AllGlobally(Box<Condition>),
    /// AF: along every path the formula eventually holds.
    AllFinally(Box<Condition>),
    /// AU: along every path `lhs` holds until `rhs` does.
    AllUntil(Box<(Condition, Condition)>),
    /// In every reachable marking no place holds more tokens than the bound.
    KSafe(Expr),
    /// Structural control property over the given formula.
    Control(Box<Condition>),
    /// Probability that the formula eventually holds.
    ProbabilityFinally(Box<Probability>),
    /// Probability that the formula always holds.
    ProbabilityGlobally(Box<Probability>),
}

impl Condition {
    /// The constant `true` condition.
    pub const TRUE: Condition = Condition::Boolean(true);
    /// The constant `false` condition.
    pub const FALSE: Condition = Condition::Boolean(false);

    /// Conjunction of `self` and `other`.
    pub fn and(self, other: Self) -> Self {
        Condition::And(Box::new((self, other)))
    }

    /// Disjunction of `self` and `other`.
    pub fn or(self, other: Self) -> Self {
        Condition::Or(Box::new((self, other)))
    }

    /// EX `self`.
    pub fn ex(self) -> Self {
        Condition::ExistsNext(Box::new(self))
    }

    /// EG `self`.
    pub fn eg(self) -> Self {
        Condition::ExistsGlobally(Box::new(self))
    }

    /// EF `self`.
    pub fn ef(self) -> Self {
        Condition::ExistsFinally(Box::new(self))
    }

    /// E[`self` U `other`].
    pub fn eu(self, other: Self) -> Self {
        Condition::ExistsUntil(Box::new((self, other)))
    }

    /// AX `self`.
    pub fn ax(self) -> Self {
        Condition::AllNext(Box::new(self))
    }

    /// AG `self`.
    pub fn ag(self) -> Self {
        Condition::AllGlobally(Box::new(self))
    }

    /// AF `self`.
    pub fn af(self) -> Self {
        Condition::AllFinally(Box::new(self))
    }

    /// A[`self` U `other`].
    pub fn au(self, other: Self) -> Self {
        Condition::AllUntil(Box::new((self, other)))
    }

    /// Settings of a statistical query, if this is one.
    pub fn settings(&self) -> Option<&SmcSettings> {
        match self {
            Condition::ProbabilityFinally(proba) | Condition::ProbabilityGlobally(proba) => {
                Some(&proba.settings)
            }
            _ => None,
        }
    }

    /// Observables of a statistical query, if this is one.
    pub fn observables(&self) -> Option<&[Observable]> {
        match self {
            Condition::ProbabilityFinally(proba) | Condition::ProbabilityGlobally(proba) => {
                Some(&proba.observables)
            }
            _ => None,
        }
    }

    /// Mutable access to the observables of a statistical query, if this is one.
    pub fn observables_mut(&mut self) -> Option<&mut Vec<Observable>> {
        match self {
            Condition::ProbabilityFinally(proba) | Condition::ProbabilityGlobally(proba) => {
                Some(&mut proba.observables)
            }
            _ => None,
        }
    }

    /// Whether the condition is a statistical query.
    pub fn is_statistical(&self) -> bool {
        self.settings().is_some()
    }

    /// Whether the condition contains no temporal operator,
    /// i.e., it can be evaluated on a single marking.
    pub fn is_state_formula(&self) -> bool {
        match self {
            Condition::Boolean(_)
            | Condition::Deadlock
            | Condition::Equal(_)
            | Condition::NotEqual(_)
            | Condition::LessThan(_)
            | Condition::LessThanOrEqual(_) => true,
            Condition::Not(cond) => cond.is_state_formula(),
            Condition::And(conds) | Condition::Or(conds) => {
                conds.0.is_state_formula() && conds.1.is_state_formula()
            }
            Condition::ExistsNext(_)
            | Condition::ExistsGlobally(_)
            | Condition::ExistsFinally(_)
            | Condition::ExistsUntil(_)
            | Condition::AllNext(_)
            | Condition::AllGlobally(_)
            | Condition::AllFinally(_)
            | Condition::AllUntil(_)
            | Condition::KSafe(_)
            | Condition::Control(_)
            | Condition::ProbabilityFinally(_)
            | Condition::ProbabilityGlobally(_) => false,
        }
    }

    /// Names of the places referenced by the condition, observables included.
    pub fn places(&self) -> BTreeSet<&str> {
        let mut places = BTreeSet::new();
        self.collect_places(&mut places);
        places
    }

    fn collect_places<'a>(&'a self, places: &mut BTreeSet<&'a str>) {
        match self {
            Condition::Boolean(_) | Condition::Deadlock => {}
            Condition::Equal(exprs)
            | Condition::NotEqual(exprs)
            | Condition::LessThan(exprs)
            | Condition::LessThanOrEqual(exprs) => {
                exprs.0.collect_places(places);
                exprs.1.collect_places(places);
            }
            Condition::KSafe(bound) => bound.collect_places(places),
            Condition::Not(cond)
            | Condition::ExistsNext(cond)
            | Condition::ExistsGlobally(cond)
            | Condition::ExistsFinally(cond)
            | Condition::AllNext(cond)
            | Condition::AllGlobally(cond)
            | Condition::AllFinally(cond)
            | Condition::Control(cond) => cond.collect_places(places),
            Condition::And(conds)
            | Condition::Or(conds)
            | Condition::ExistsUntil(conds)
            | Condition::AllUntil(conds) => {
                conds.0.collect_places(places);
                conds.1.collect_places(places);
            }
            Condition::ProbabilityFinally(proba) | Condition::ProbabilityGlobally(proba) => {
                proba.condition.collect_places(places);
                proba
                    .observables
                    .iter()
                    .for_each(|(_, expr)| expr.collect_places(places));
            }
        }
    }
}

impl Not for Condition {
    type Output = Condition;

    fn not(self) -> Self::Output {
        Condition::Not(Box::new(self))
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        if value {
            Condition::TRUE
        } else {
            Condition::FALSE
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Boolean(val) => write!(f, "{val}"),
            Condition::Deadlock => write!(f, "deadlock"),
            Condition::Not(cond) => write!(f, "!({cond})"),
            Condition::And(conds) => write!(f, "({} && {})", conds.0, conds.1),
            Condition::Or(conds) => write!(f, "({} || {})", conds.0, conds.1),
            Condition::Equal(exprs) => write!(f, "({} == {})", exprs.0, exprs.1),
            Condition::NotEqual(exprs) => write!(f, "({} != {})", exprs.0, exprs.1),
            Condition::LessThan(exprs) => write!(f, "({} < {})", exprs.0, exprs.1),
            Condition::LessThanOrEqual(exprs) => write!(f, "({} <= {})", exprs.0, exprs.1),
            Condition::ExistsNext(cond) => write!(f, "EX {cond}"),
            Condition::ExistsGlobally(cond) => write!(f, "EG {cond}"),
            Condition::ExistsFinally(cond) => write!(f, "EF {cond}"),
            Condition::ExistsUntil(conds) => write!(f, "E[{} U {}]", conds.0, conds.1),
            Condition::AllNext(cond) => write!(f, "AX {cond}"),
            Condition::AllGlobally(cond) => write!(f, "AG {cond}"),
            Condition::AllFinally(cond) => write!(f, "AF {cond}"),
            Condition::AllUntil(conds) => write!(f, "A[{} U {}]", conds.0, conds.1),
            Condition::KSafe(bound) => write!(f, "k-safe({bound})"),
            Condition::Control(cond) => write!(f, "control({cond})"),
            Condition::ProbabilityFinally(proba) => write!(f, "PF {}", proba.condition),
            Condition::ProbabilityGlobally(proba) => write!(f, "PG {}", proba.condition),
        }
    }
}
