//! Scope feasibility analysis against industry benchmarks.

use serde::{Deserialize, Serialize};

use crate::benchmark::IndustryBenchmark;
use crate::input::PlanInput;

/// Daily-cost ratio window considered realistic, bounds inclusive.
pub const REALISTIC_RATIO_MIN: f64 = 0.7;
pub const REALISTIC_RATIO_MAX: f64 = 1.3;

/// Result of comparing a plan's daily spend against the benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeAnalysis {
    pub is_realistic: bool,
    /// Daily cost divided by the benchmark daily cost.
    pub benchmark_comparison: f64,
    pub recommendations: Vec<String>,
}

/// Compare budget-per-day against the benchmark and derive recommendations.
///
/// A zero duration yields a zero daily cost (and therefore an "insufficient
/// budget" recommendation set) rather than an error; the case is logged
/// because it almost always means bad input.
pub fn analyze_scope(input: &PlanInput, benchmark: &IndustryBenchmark) -> ScopeAnalysis {
    let daily_cost = if input.duration == 0 {
        tracing::warn!(title = %input.title, "zero duration in scope analysis, daily cost set to 0");
        0.0
    } else {
        input.budget / f64::from(input.duration)
    };

    let ratio = daily_cost / benchmark.cost_per_day;

    ScopeAnalysis {
        is_realistic: (REALISTIC_RATIO_MIN..=REALISTIC_RATIO_MAX).contains(&ratio),
        benchmark_comparison: ratio,
        recommendations: recommendations_for(ratio),
    }
}

fn recommendations_for(ratio: f64) -> Vec<String> {
    if ratio < REALISTIC_RATIO_MIN {
        vec![
            "Budget may be insufficient for scope".to_owned(),
            "Consider reducing scope or increasing budget".to_owned(),
            "Focus on critical path items only".to_owned(),
        ]
    } else if ratio > REALISTIC_RATIO_MAX {
        vec![
            "Budget higher than industry average".to_owned(),
            "Opportunity for scope optimization".to_owned(),
            "Consider parallel work streams".to_owned(),
        ]
    } else {
        vec!["Budget aligns with industry benchmarks".to_owned()]
    }
}
