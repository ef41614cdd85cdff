// 📊 Aggregator
// Per-state and per-month rollups of the three datasets
//
// Pure functions over loaded tables; recomputed on every query.

use crate::loader::Datasets;
use crate::records::{BiometricRecord, Record};
use crate::risk::RiskTier;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// OUTPUT TABLES
// ============================================================================

/// One row per canonical state. Fields from a dataset the state is absent from are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub state: String,
    pub bio_age_5_17: Option<u64>,
    pub bio_age_17_: Option<u64>,
    pub youth_bio_pct: Option<f64>,
    pub demo_age_5_17: Option<u64>,
    pub demo_age_17_: Option<u64>,
    pub youth_demo_pct: Option<f64>,
    pub age_5_17: Option<u64>,
    pub age_18_greater: Option<u64>,
    pub risk_category: RiskTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    pub bio_age_5_17: u64,
    pub bio_age_17_: u64,
    pub youth_bio_pct: Option<f64>,
    pub month_str: String,
}

/// Both derived tables, computed together from one snapshot of the datasets
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub states: Vec<RegionSummary>,
    pub monthly: Vec<MonthlyTrend>,
}

impl Analysis {
    pub fn compute(data: &Datasets) -> Self {
        Analysis {
            states: summarize_states(data),
            monthly: monthly_trend(&data.biometric),
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// young / (young + adult) × 100, or `None` when both brackets are zero
pub fn youth_share(young: u64, adult: u64) -> Option<f64> {
    let total = young + adult;
    if total == 0 {
        None
    } else {
        Some(young as f64 / total as f64 * 100.0)
    }
}

/// Descending by share, undefined shares last
pub fn compare_share_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sum both age brackets per state. Rows without a state are not grouped.
pub fn totals_by_state<R: Record>(rows: &[R]) -> BTreeMap<String, (u64, u64)> {
    let mut totals: BTreeMap<String, (u64, u64)> = BTreeMap::new();

    for row in rows {
        let Some(state) = row.state() else {
            continue;
        };
        let (young, adult) = row.counts();
        let entry = totals.entry(state.to_string()).or_insert((0, 0));
        entry.0 += young;
        entry.1 += adult;
    }

    totals
}

// ============================================================================
// STATE SUMMARY
// ============================================================================

/// Outer join of the biometric, demographic and enrolment rollups, sorted by
/// youth_bio_pct descending. Ties keep alphabetical order of the state name.
pub fn summarize_states(data: &Datasets) -> Vec<RegionSummary> {
    let bio = totals_by_state(&data.biometric);
    let demo = totals_by_state(&data.demographic);
    let enrol = totals_by_state(&data.enrolment);

    let states: BTreeSet<&String> = bio.keys().chain(demo.keys()).chain(enrol.keys()).collect();

    let mut summary: Vec<RegionSummary> = states
        .into_iter()
        .map(|state| {
            let bio_counts = bio.get(state).copied();
            let demo_counts = demo.get(state).copied();
            let enrol_counts = enrol.get(state).copied();

            let youth_bio_pct = bio_counts.and_then(|(young, adult)| youth_share(young, adult));
            let youth_demo_pct = demo_counts.and_then(|(young, adult)| youth_share(young, adult));

            RegionSummary {
                state: state.clone(),
                bio_age_5_17: bio_counts.map(|c| c.0),
                bio_age_17_: bio_counts.map(|c| c.1),
                youth_bio_pct,
                demo_age_5_17: demo_counts.map(|c| c.0),
                demo_age_17_: demo_counts.map(|c| c.1),
                youth_demo_pct,
                age_5_17: enrol_counts.map(|c| c.0),
                age_18_greater: enrol_counts.map(|c| c.1),
                risk_category: RiskTier::classify(youth_bio_pct),
            }
        })
        .collect();

    // sort_by is stable
    summary.sort_by(|a, b| compare_share_desc(a.youth_bio_pct, b.youth_bio_pct));
    summary
}

// ============================================================================
// MONTHLY TREND
// ============================================================================

/// Biometric totals per calendar month, oldest first
pub fn monthly_trend(rows: &[BiometricRecord]) -> Vec<MonthlyTrend> {
    let mut months: BTreeMap<(i32, u32), (u64, u64)> = BTreeMap::new();

    for row in rows {
        let date = row.date();
        let (young, adult) = row.counts();
        let entry = months.entry((date.year(), date.month())).or_insert((0, 0));
        entry.0 += young;
        entry.1 += adult;
    }

    months
        .into_iter()
        .map(|((year, month), (young, adult))| {
            let label = format!("{:04}-{:02}", year, month);
            MonthlyTrend {
                month: label.clone(),
                bio_age_5_17: young,
                bio_age_17_: adult,
                youth_bio_pct: youth_share(young, adult),
                month_str: label,
            }
        })
        .collect()
}
