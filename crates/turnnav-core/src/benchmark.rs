//! Industry benchmark reference data.
//!
//! Figures used by the scope analyzer and embedded into every generated
//! plan. Only the refinery profile is calibrated today; unknown plant types
//! fall back to it rather than failing the analysis.

/// Typical turnaround durations by project size, as display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationRanges {
    pub small: &'static str,
    pub medium: &'static str,
    pub large: &'static str,
}

/// Cost and safety benchmarks for one plant type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndustryBenchmark {
    pub plant_type: &'static str,
    /// Expected spend per turnaround day, USD.
    pub cost_per_day: f64,
    /// Recordable incidents per 200k work hours.
    pub safety_incident_rate: f64,
    pub typical_durations: DurationRanges,
}

/// Refinery benchmark profile.
pub const REFINERY: IndustryBenchmark = IndustryBenchmark {
    plant_type: "refinery",
    cost_per_day: 1_500_000.0,
    safety_incident_rate: 0.5,
    typical_durations: DurationRanges {
        small: "20-30 days",
        medium: "35-50 days",
        large: "45-70 days",
    },
};

/// All calibrated profiles.
const BENCHMARKS: [&IndustryBenchmark; 1] = [&REFINERY];

/// Look up the benchmark profile for a plant type.
///
/// Matching is case-insensitive and whitespace-tolerant; anything
/// unrecognized gets the refinery profile.
pub fn benchmark_for(plant_type: &str) -> &'static IndustryBenchmark {
    let wanted = plant_type.trim().to_ascii_lowercase();
    BENCHMARKS
        .iter()
        .find(|b| b.plant_type == wanted)
        .copied()
        .unwrap_or(&REFINERY)
}
