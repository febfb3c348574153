//! Abstract syntax of the Petri net Query Language (PQL)
//! as consumed by the PQL model-checking engine.
//!
//! A query is a [`Condition`]: a tree of CTL temporal operators,
//! propositional connectives, comparisons between integer [`Expr`]essions over place markings,
//! and the macro properties *k-safe* and *control*.
//! Statistical queries wrap their formula in [`Condition::ProbabilityFinally`]
//! or [`Condition::ProbabilityGlobally`], together with their [`SmcSettings`]
//! and an optional list of [`Observable`]s.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod condition;
mod expression;
mod smc;

pub use condition::*;
pub use expression::*;
pub use smc::*;
