//! Rule-based fundamental scoring.
//!
//! A [`ScoringPolicy`] is a flat checklist: each [`Rule`] awards fixed points
//! when a ratio crosses a constant or a sector benchmark. Built-in policies
//! are independent of each other and scored separately.

mod benchmark;
mod fundamentals;
mod policy;

pub use benchmark::{benchmark_for, BenchmarkKey, SectorBenchmark};
pub use fundamentals::{Fundamentals, Metric};
pub use policy::{
    builtin_policies, get_policy, Comparison, Recommendation, Rule, RuleCheck, ScoreCard,
    ScoringPolicy, Threshold, BUILTIN_POLICIES, MAX_SCORE,
};
