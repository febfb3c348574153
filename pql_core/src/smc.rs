//! Settings of statistical model checking (SMC) queries.
//!
//! The statistical tests themselves are run by the engine:
//! here settings are only stored.

use crate::{Expr, Integer};
use serde::Serialize;

/// Named integer expression whose value is recorded along sampled runs.
pub type Observable = (String, Expr);

/// Configuration of a statistical query.
///
/// Bounds equal to [`Integer::MAX`] mean the run is unbounded in that dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmcSettings {
    /// Bound on the duration of a run.
    pub time_bound: Integer,
    /// Bound on the number of steps of a run.
    pub step_bound: Integer,
    /// Probability of accepting a false hypothesis.
    pub false_positives: f32,
    /// Probability of rejecting a true hypothesis.
    pub false_negatives: f32,
    /// Upper half-width of the indifference region.
    pub indifference_region_up: f32,
    /// Lower half-width of the indifference region.
    pub indifference_region_down: f32,
    /// Confidence of the probability estimation.
    pub confidence: f32,
    /// Width of the confidence interval of the estimation.
    pub estimation_interval_width: f32,
    /// Whether the query is a hypothesis test against [`SmcSettings::geq_than`]
    /// rather than a probability estimation.
    pub compare_to_float: bool,
    /// Threshold of the hypothesis test.
    pub geq_than: f32,
}

impl Default for SmcSettings {
    fn default() -> Self {
        Self {
            time_bound: Integer::MAX,
            step_bound: Integer::MAX,
            false_positives: 0.05,
            false_negatives: 0.05,
            indifference_region_up: 0.05,
            indifference_region_down: 0.05,
            confidence: 0.95,
            estimation_interval_width: 0.05,
            compare_to_float: false,
            geq_than: 0.0,
        }
    }
}

impl SmcSettings {
    /// Whether runs are bounded neither in time nor in steps.
    pub fn is_unbounded(&self) -> bool {
        self.time_bound == Integer::MAX && self.step_bound == Integer::MAX
    }
}
