// 🧹 Offline Cleaning Utility
// Normalizes the raw extracts once and persists a snapshot the server can load directly
//
// Every snapshot file is written to `<name>.tmp` first and renamed over the target.

use crate::aggregate::{Analysis, RegionSummary};
use crate::loader::{concat_extracts, normalize_rows, DataPaths, Datasets};
use crate::query::national_average;
use crate::records::{BiometricRecord, DemographicRecord, EnrolmentRecord, Record};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const STATE_SUMMARY_FILE: &str = "state_summary_cleaned.csv";

const TOP_STATES_BY_RECORDS: usize = 10;
const RANKING_TOP: usize = 15;
const RANKING_BOTTOM: usize = 10;

// ============================================================================
// REPORT
// ============================================================================

/// Before/after figures for one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetCleaning {
    pub name: &'static str,
    pub records: usize,
    pub states_before: usize,
    pub states_after: usize,
    /// Most frequent states after cleaning, by record count
    pub top_states: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedState {
    pub rank: usize,
    pub state: String,
    pub youth_bio_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleaningReport {
    pub datasets: Vec<DatasetCleaning>,
    /// States with a positive youth_bio_pct
    pub valid_states: usize,
    pub best: Option<RankedState>,
    pub worst: Option<RankedState>,
    /// best / worst, 0 when there is no positive worst
    pub gap: f64,
    pub national_avg: Option<f64>,
    pub national_median: Option<f64>,
    pub top: Vec<RankedState>,
    pub bottom: Vec<RankedState>,
    pub written: Vec<PathBuf>,
}

// ============================================================================
// CLEANING
// ============================================================================

fn distinct_states<R: Record>(rows: &[R]) -> usize {
    rows.iter().filter_map(|r| r.state()).collect::<BTreeSet<_>>().len()
}

fn top_states_by_records<R: Record>(rows: &[R], limit: usize) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for state in rows.iter().filter_map(|r| r.state()) {
        *counts.entry(state).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(state, count)| (state.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

/// Load one raw dataset, normalize it in place, and describe what changed
pub fn clean_dataset<R: Record>(dir: &Path) -> Result<(Vec<R>, DatasetCleaning)> {
    let mut rows = concat_extracts::<R>(dir)
        .with_context(|| format!("Failed to load {} extracts", R::KIND))?;

    let states_before = distinct_states(&rows);
    normalize_rows(&mut rows);

    let stats = DatasetCleaning {
        name: R::KIND,
        records: rows.len(),
        states_before,
        states_after: distinct_states(&rows),
        top_states: top_states_by_records(&rows, TOP_STATES_BY_RECORDS),
    };

    info!(
        kind = R::KIND,
        records = stats.records,
        states_before = stats.states_before,
        states_after = stats.states_after,
        "dataset cleaned"
    );

    Ok((rows, stats))
}

fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Ranking over states with a positive biometric youth share.
/// `states` must already be sorted by youth_bio_pct descending.
fn rank_valid_states(states: &[RegionSummary]) -> Vec<RankedState> {
    states
        .iter()
        .filter_map(|s| match s.youth_bio_pct {
            Some(pct) if pct > 0.0 => Some((s.state.clone(), pct)),
            _ => None,
        })
        .enumerate()
        .map(|(i, (state, youth_bio_pct))| RankedState {
            rank: i + 1,
            state,
            youth_bio_pct,
        })
        .collect()
}

/// Write rows as CSV to a temporary sibling, then rename it over `path`
pub fn write_csv_atomic<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let tmp = path.with_extension("csv.tmp");

    {
        let mut wtr = csv::Writer::from_path(&tmp)
            .with_context(|| format!("Failed to create {}", tmp.display()))?;
        for row in rows {
            wtr.serialize(row)
                .with_context(|| format!("Failed to write {}", tmp.display()))?;
        }
        wtr.flush()
            .with_context(|| format!("Failed to flush {}", tmp.display()))?;
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move {} into place", path.display()))?;
    Ok(())
}

/// Clean all three raw datasets, persist the snapshot, and build the summary report
pub fn run_cleaning(paths: &DataPaths) -> Result<CleaningReport> {
    let (biometric, bio_stats) = clean_dataset::<BiometricRecord>(&paths.biometric_dir)?;
    let (demographic, demo_stats) = clean_dataset::<DemographicRecord>(&paths.demographic_dir)?;
    let (enrolment, enrol_stats) = clean_dataset::<EnrolmentRecord>(&paths.enrolment_dir)?;

    let data = Datasets {
        biometric,
        demographic,
        enrolment,
    };
    let analysis = Analysis::compute(&data);

    let ranked = rank_valid_states(&analysis.states);
    let best = ranked.first().cloned();
    let worst = ranked.last().cloned();
    let gap = match (&best, &worst) {
        (Some(b), Some(w)) if w.youth_bio_pct > 0.0 => b.youth_bio_pct / w.youth_bio_pct,
        _ => 0.0,
    };

    let valid: Vec<RegionSummary> = analysis
        .states
        .iter()
        .filter(|s| s.youth_bio_pct.map(|p| p > 0.0).unwrap_or(false))
        .cloned()
        .collect();
    let mut shares: Vec<f64> = ranked.iter().map(|r| r.youth_bio_pct).collect();
    shares.sort_by(|a, b| a.total_cmp(b));

    let bottom_start = ranked.len().saturating_sub(RANKING_BOTTOM);

    // Persist
    fs::create_dir_all(&paths.cleaned_dir)
        .with_context(|| format!("Failed to create {}", paths.cleaned_dir.display()))?;

    let mut written = Vec::new();
    let targets = [
        paths.cleaned_dir.join(BiometricRecord::SNAPSHOT_FILE),
        paths.cleaned_dir.join(DemographicRecord::SNAPSHOT_FILE),
        paths.cleaned_dir.join(EnrolmentRecord::SNAPSHOT_FILE),
        paths.cleaned_dir.join(STATE_SUMMARY_FILE),
    ];
    write_csv_atomic(&targets[0], &data.biometric)?;
    write_csv_atomic(&targets[1], &data.demographic)?;
    write_csv_atomic(&targets[2], &data.enrolment)?;
    write_csv_atomic(&targets[3], &analysis.states)?;
    for target in targets {
        info!(path = %target.display(), "snapshot written");
        written.push(target);
    }

    Ok(CleaningReport {
        datasets: vec![bio_stats, demo_stats, enrol_stats],
        valid_states: ranked.len(),
        best,
        worst,
        gap,
        national_avg: national_average(&valid),
        national_median: median(&shares),
        top: ranked.iter().take(RANKING_TOP).cloned().collect(),
        bottom: ranked[bottom_start..].to_vec(),
        written,
    })
}

// ============================================================================
// PRINTING
// ============================================================================

fn rule(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}", "=".repeat(80))
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ds in &self.datasets {
            writeln!(f)?;
            rule(f)?;
            writeln!(f, "CLEANING: {} data", ds.name)?;
            rule(f)?;
            writeln!(f, "Records: {}", ds.records)?;
            writeln!(f, "Unique states before cleaning: {}", ds.states_before)?;
            writeln!(f, "Unique states after cleaning:  {}", ds.states_after)?;
            writeln!(f, "\nTop {} states by record count:", ds.top_states.len())?;
            for (state, count) in &ds.top_states {
                writeln!(f, "  {}: {} records", state, count)?;
            }
        }

        writeln!(f)?;
        rule(f)?;
        writeln!(f, "BIOMETRIC RANKING (CLEANED)")?;
        rule(f)?;
        writeln!(f, "   Total States: {}", self.valid_states)?;
        if let (Some(best), Some(worst)) = (&self.best, &self.worst) {
            writeln!(f, "   Best Performer: {} = {:.2}%", best.state, best.youth_bio_pct)?;
            writeln!(f, "   Worst Performer: {} = {:.2}%", worst.state, worst.youth_bio_pct)?;
            writeln!(f, "   Gap Ratio: {:.2}X", self.gap)?;
        }
        if let Some(avg) = self.national_avg {
            writeln!(f, "   National Average: {:.2}%", avg)?;
        }
        if let Some(median) = self.national_median {
            writeln!(f, "   National Median: {:.2}%", median)?;
        }

        writeln!(f, "\n🏆 TOP {} STATES:", self.top.len())?;
        for r in &self.top {
            writeln!(f, "   {:2}. {:<30} {:6.2}%", r.rank, r.state, r.youth_bio_pct)?;
        }

        writeln!(f, "\n⚠️  BOTTOM {} STATES:", self.bottom.len())?;
        for r in &self.bottom {
            writeln!(f, "   {:2}. {:<30} {:6.2}%", r.rank, r.state, r.youth_bio_pct)?;
        }

        writeln!(f)?;
        for path in &self.written {
            writeln!(f, "✅ Saved: {}", path.display())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load, DataSource};
    use crate::risk::RiskTier;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), contents).unwrap();
    }

    fn fixture(root: &Path) -> DataPaths {
        let paths = DataPaths {
            biometric_dir: root.join("bio"),
            demographic_dir: root.join("demo"),
            enrolment_dir: root.join("enrol"),
            cleaned_dir: root.join("cleaned_data"),
        };
        write(
            &paths.biometric_dir,
            "a.csv",
            "state,district,pincode,date,bio_age_5_17,bio_age_17_\n\
             WEST BENGAL,Kolkata,700001,01-03-2025,30,70\n\
             West Bengal,Howrah,711101,02-04-2025,20,80\n\
             Orissa,Cuttack,753001,01-03-2025,60,40\n\
             Goa,North Goa,403001,01-03-2025,0,10\n",
        );
        write(
            &paths.demographic_dir,
            "a.csv",
            "state,district,pincode,date,demo_age_5_17,demo_age_17_\n\
             odisha,Cuttack,753001,01-03-2025,1,1\n",
        );
        write(
            &paths.enrolment_dir,
            "a.csv",
            "state,district,pincode,date,age_5_17,age_18_greater\n\
             Pondicherry,Puducherry,605001,01-03-2025,2,2\n",
        );
        paths
    }

    #[test]
    fn test_report_counts_and_ranking() {
        let tmp = TempDir::new().unwrap();
        let paths = fixture(tmp.path());

        let report = run_cleaning(&paths).unwrap();

        let bio = &report.datasets[0];
        assert_eq!(bio.name, "biometric");
        assert_eq!(bio.records, 4);
        assert_eq!(bio.states_before, 4);
        assert_eq!(bio.states_after, 3);
        assert_eq!(bio.top_states[0], ("West Bengal".to_string(), 2));

        // Goa sits at 0% and is excluded from the ranking
        assert_eq!(report.valid_states, 2);
        let best = report.best.as_ref().unwrap();
        let worst = report.worst.as_ref().unwrap();
        assert_eq!(best.state, "Odisha");
        assert_eq!(worst.state, "West Bengal");
        assert_eq!(worst.rank, 2);
        assert!((report.gap - 2.4).abs() < 1e-9);
        assert_eq!(report.national_median, Some(42.5));

        let text = report.to_string();
        assert!(text.contains("CLEANING: biometric data"));
        assert!(text.contains("Gap Ratio: 2.40X"));
    }

    #[test]
    fn test_snapshot_round_trips_through_loader() {
        let tmp = TempDir::new().unwrap();
        let paths = fixture(tmp.path());

        let report = run_cleaning(&paths).unwrap();
        assert_eq!(report.written.len(), 4);
        assert!(paths.has_cleaned_snapshot());
        assert!(!paths.cleaned_dir.join("biometric_cleaned.csv.tmp").exists());

        let data = load(DataSource::Cleaned, &paths).unwrap();
        assert_eq!(data.biometric.len(), 4);
        assert_eq!(data.demographic[0].state.as_deref(), Some("Odisha"));
        assert_eq!(data.enrolment[0].state.as_deref(), Some("Puducherry"));

        let summary = fs::read_to_string(paths.cleaned_dir.join(STATE_SUMMARY_FILE)).unwrap();
        assert!(summary.starts_with("state,bio_age_5_17,bio_age_17_,youth_bio_pct"));
        assert!(summary.contains("Puducherry,,,,,,,2,2,Unknown"));
    }

    #[test]
    fn test_snapshot_summary_matches_live_analysis() {
        let tmp = TempDir::new().unwrap();
        let paths = fixture(tmp.path());

        run_cleaning(&paths).unwrap();
        let analysis = Analysis::compute(&load(DataSource::Cleaned, &paths).unwrap());

        let wb = analysis.states.iter().find(|s| s.state == "West Bengal").unwrap();
        assert_eq!(wb.youth_bio_pct, Some(25.0));
        assert_eq!(wb.risk_category, RiskTier::Critical);
    }

    #[test]
    fn test_missing_raw_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let mut paths = fixture(tmp.path());
        paths.enrolment_dir = tmp.path().join("nope");

        let err = run_cleaning(&paths).unwrap_err();
        assert!(format!("{:#}", err).contains("enrolment"));
        assert!(!paths.has_cleaned_snapshot());
    }
}
