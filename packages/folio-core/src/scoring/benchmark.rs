//! Sector benchmark ratios that scoring rules compare against.

use serde::{Deserialize, Serialize};

/// Which benchmark figure a rule compares to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkKey {
    Pe,
    Margin,
    Roe,
}

/// Reference ratios for a sector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SectorBenchmark {
    /// Price to earnings
    pub pe: f64,
    /// Net profit margin (fraction)
    pub margin: f64,
    /// Return on equity (fraction)
    pub roe: f64,
}

impl Default for SectorBenchmark {
    fn default() -> Self {
        Self {
            pe: 20.0,
            margin: 0.10,
            roe: 0.12,
        }
    }
}

impl SectorBenchmark {
    pub fn value(&self, key: BenchmarkKey) -> f64 {
        match key {
            BenchmarkKey::Pe => self.pe,
            BenchmarkKey::Margin => self.margin,
            BenchmarkKey::Roe => self.roe,
        }
    }
}

/// Benchmark for a sector.
///
/// No per-sector table is maintained; every sector gets the market-wide default.
pub fn benchmark_for(_sector: Option<&str>) -> SectorBenchmark {
    SectorBenchmark::default()
}
