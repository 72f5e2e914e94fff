//! Checklist scoring policies.

use super::benchmark::{BenchmarkKey, SectorBenchmark};
use super::fundamentals::{Fundamentals, Metric};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Highest score any policy can award.
pub const MAX_SCORE: u32 = 100;

/// How a metric value must relate to its threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// value > threshold
    Above,
    /// value < threshold
    Below,
    /// 0 < value < threshold (e.g., a positive P/E under the benchmark)
    PositiveBelow,
}

impl Comparison {
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Above => value > threshold,
            Comparison::Below => value < threshold,
            Comparison::PositiveBelow => value > 0.0 && value < threshold,
        }
    }
}

/// Where a rule takes its threshold from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    Fixed(f64),
    Benchmark(BenchmarkKey),
}

impl Threshold {
    pub fn resolve(&self, benchmark: &SectorBenchmark) -> f64 {
        match self {
            Threshold::Fixed(v) => *v,
            Threshold::Benchmark(key) => benchmark.value(*key),
        }
    }
}

/// One checklist item: award `points` when the metric passes the comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub metric: Metric,
    pub comparison: Comparison,
    pub threshold: Threshold,
    pub points: u32,
}

impl Rule {
    pub fn new(metric: Metric, comparison: Comparison, threshold: Threshold, points: u32) -> Self {
        Self {
            metric,
            comparison,
            threshold,
            points,
        }
    }
}

/// Outcome of one rule for one company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleCheck {
    pub metric: Metric,
    pub comparison: Comparison,
    pub value: f64,
    pub threshold: f64,
    pub passed: bool,
    pub points: u32,
}

/// Verdict derived from a score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongBuy,
    Hold,
    Sell,
}

impl Recommendation {
    /// 70 and up is a strong buy, 50 and up a hold, anything lower a sell.
    pub fn from_score(score: u32) -> Self {
        if score >= 70 {
            Recommendation::StrongBuy
        } else if score >= 50 {
            Recommendation::Hold
        } else {
            Recommendation::Sell
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "STRONG BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::Sell => "SELL",
        }
    }
}

/// Full scoring result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreCard {
    pub symbol: String,
    pub policy: String,
    pub score: u32,
    pub recommendation: Recommendation,
    pub benchmark: SectorBenchmark,
    pub checks: Vec<RuleCheck>,
}

/// A named checklist of rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Policy identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// What the policy favors
    pub description: String,
    pub rules: Vec<Rule>,
}

impl ScoringPolicy {
    /// Run every rule and sum the awarded points, capped at 100.
    pub fn evaluate(&self, data: &Fundamentals, benchmark: &SectorBenchmark) -> ScoreCard {
        let checks: Vec<RuleCheck> = self
            .rules
            .iter()
            .map(|rule| {
                let value = data.get(rule.metric);
                let threshold = rule.threshold.resolve(benchmark);
                let passed = rule.comparison.holds(value, threshold);
                RuleCheck {
                    metric: rule.metric,
                    comparison: rule.comparison,
                    value,
                    threshold,
                    passed,
                    points: if passed { rule.points } else { 0 },
                }
            })
            .collect();

        let score = checks.iter().map(|c| c.points).sum::<u32>().min(MAX_SCORE);

        ScoreCard {
            symbol: data.symbol.clone(),
            policy: self.id.clone(),
            score,
            recommendation: Recommendation::from_score(score),
            benchmark: *benchmark,
            checks,
        }
    }

    /// Score only.
    pub fn score(&self, data: &Fundamentals, benchmark: &SectorBenchmark) -> u32 {
        self.evaluate(data, benchmark).score
    }

    /// Points available if every rule passes, before the cap.
    pub fn max_points(&self) -> u32 {
        self.rules.iter().map(|r| r.points).sum()
    }
}

fn classic() -> ScoringPolicy {
    use Comparison::*;
    use Metric::*;

    ScoringPolicy {
        id: "classic".to_string(),
        name: "Classic Checklist".to_string(),
        description: "Valuation, profitability and growth against the sector benchmark"
            .to_string(),
        rules: vec![
            Rule::new(TrailingPe, PositiveBelow, Threshold::Benchmark(BenchmarkKey::Pe), 20),
            Rule::new(ProfitMargin, Above, Threshold::Benchmark(BenchmarkKey::Margin), 15),
            Rule::new(ReturnOnEquity, Above, Threshold::Benchmark(BenchmarkKey::Roe), 15),
            Rule::new(RevenueGrowth, Above, Threshold::Fixed(0.05), 10),
            Rule::new(EarningsGrowth, Above, Threshold::Fixed(0.05), 10),
            Rule::new(CurrentRatio, Above, Threshold::Fixed(1.5), 10),
            Rule::new(DebtToEquity, Below, Threshold::Fixed(1.0), 10),
            Rule::new(FreeCashFlow, Above, Threshold::Fixed(0.0), 10),
        ],
    }
}

fn value() -> ScoringPolicy {
    use Comparison::*;
    use Metric::*;

    ScoringPolicy {
        id: "value".to_string(),
        name: "Deep Value".to_string(),
        description: "Cheap earnings, low leverage and strong liquidity".to_string(),
        rules: vec![
            Rule::new(TrailingPe, PositiveBelow, Threshold::Fixed(15.0), 30),
            Rule::new(DebtToEquity, Below, Threshold::Fixed(0.5), 20),
            Rule::new(CurrentRatio, Above, Threshold::Fixed(2.0), 15),
            Rule::new(ProfitMargin, Above, Threshold::Benchmark(BenchmarkKey::Margin), 15),
            Rule::new(FreeCashFlow, Above, Threshold::Fixed(0.0), 20),
        ],
    }
}

fn growth() -> ScoringPolicy {
    use Comparison::*;
    use Metric::*;

    ScoringPolicy {
        id: "growth".to_string(),
        name: "Growth".to_string(),
        description: "Fast revenue and earnings growth with above-benchmark returns".to_string(),
        rules: vec![
            Rule::new(RevenueGrowth, Above, Threshold::Fixed(0.15), 30),
            Rule::new(EarningsGrowth, Above, Threshold::Fixed(0.15), 30),
            Rule::new(ReturnOnEquity, Above, Threshold::Benchmark(BenchmarkKey::Roe), 20),
            Rule::new(ProfitMargin, Above, Threshold::Benchmark(BenchmarkKey::Margin), 20),
        ],
    }
}

/// Built-in scoring policies.
pub static BUILTIN_POLICIES: LazyLock<HashMap<String, ScoringPolicy>> = LazyLock::new(|| {
    [classic(), value(), growth()]
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect()
});

/// List all built-in policies, sorted by id.
pub fn builtin_policies() -> Vec<ScoringPolicy> {
    let mut policies: Vec<ScoringPolicy> = BUILTIN_POLICIES.values().cloned().collect();
    policies.sort_by(|a, b| a.id.cmp(&b.id));
    policies
}

/// Get a built-in policy by id.
pub fn get_policy(id: &str) -> Option<ScoringPolicy> {
    BUILTIN_POLICIES.get(&id.trim().to_lowercase()).cloned()
}
