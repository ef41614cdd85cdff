// 🔎 Query Layer
// Read-only answers for the dashboard, derived from a fresh Analysis

use crate::aggregate::{Analysis, RegionSummary};
use crate::error::QueryError;
use crate::loader::Datasets;
use crate::risk::RiskTier;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Headline statistics for the dashboard's first panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_records: usize,
    pub num_states: usize,
    pub num_districts: usize,
    pub num_pincodes: usize,
    pub best_state: String,
    pub best_percentage: Option<f64>,
    pub worst_state: String,
    pub worst_percentage: Option<f64>,
    /// best / worst; `None` when either is undefined or worst is 0
    pub gap: Option<f64>,
    pub national_avg: Option<f64>,
    pub critical_states: usize,
    pub at_risk_states: usize,
    pub analysis_date: String,
}

/// Round to one decimal place for display
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean youth_bio_pct over states with a defined share
pub fn national_average(states: &[RegionSummary]) -> Option<f64> {
    let defined: Vec<f64> = states.iter().filter_map(|s| s.youth_bio_pct).collect();
    if defined.is_empty() {
        None
    } else {
        Some(defined.iter().sum::<f64>() / defined.len() as f64)
    }
}

pub fn overview(data: &Datasets, analysis: &Analysis, today: NaiveDate) -> Result<Overview, QueryError> {
    let states = &analysis.states;
    let best = states.first().ok_or(QueryError::EmptySummary)?;

    // Undefined shares sort last, so the worst comparable state is the last defined one
    let worst = states
        .iter()
        .rev()
        .find(|s| s.youth_bio_pct.is_some())
        .unwrap_or(best);

    let gap = match (best.youth_bio_pct, worst.youth_bio_pct) {
        (Some(b), Some(w)) if w > 0.0 => Some(round1(b / w)),
        _ => None,
    };

    let districts: HashSet<&str> = data.biometric.iter().map(|r| r.district.as_str()).collect();
    let pincodes: HashSet<&str> = data.biometric.iter().map(|r| r.pincode.as_str()).collect();

    let count_tier = |tier: RiskTier| states.iter().filter(|s| s.risk_category == tier).count();

    Ok(Overview {
        total_records: data.total_records(),
        num_states: states.len(),
        num_districts: districts.len(),
        num_pincodes: pincodes.len(),
        best_state: best.state.clone(),
        best_percentage: best.youth_bio_pct.map(round1),
        worst_state: worst.state.clone(),
        worst_percentage: worst.youth_bio_pct.map(round1),
        gap,
        national_avg: national_average(states).map(round1),
        critical_states: count_tier(RiskTier::Critical),
        at_risk_states: count_tier(RiskTier::AtRisk),
        analysis_date: today.format("%B %d, %Y").to_string(),
    })
}

/// Number of states per tier label. Tiers with no states are omitted.
pub fn risk_distribution(states: &[RegionSummary]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for state in states {
        *counts.entry(state.risk_category.to_string()).or_insert(0) += 1;
    }
    counts
}

/// First `n` rows of the sorted summary (all rows if `n` exceeds the length)
pub fn top_performers(states: &[RegionSummary], n: usize) -> &[RegionSummary] {
    &states[..n.min(states.len())]
}

/// Last `n` rows of the sorted summary (all rows if `n` exceeds the length)
pub fn bottom_performers(states: &[RegionSummary], n: usize) -> &[RegionSummary] {
    let len = states.len();
    &states[len - n.min(len)..]
}

/// Exact, case-sensitive lookup by canonical state name
pub fn state_detail<'a>(states: &'a [RegionSummary], name: &str) -> Result<&'a RegionSummary, QueryError> {
    states
        .iter()
        .find(|s| s.state == name)
        .ok_or_else(|| QueryError::StateNotFound(name.to_string()))
}
