// 📂 Dataset Loader
// Discovers and concatenates per-kind CSV extracts, or reads a cleaned snapshot
//
// The loaded tables are immutable and cached by DataStore for the process lifetime.

use crate::error::LoadError;
use crate::normalizer::normalize_state;
use crate::records::{BiometricRecord, DemographicRecord, EnrolmentRecord, Record};
use once_cell::sync::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

// ============================================================================
// SOURCE SELECTION
// ============================================================================

/// Where the tables come from. Resolved once at startup, never re-checked per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Per-file raw extracts; state names are normalized while loading
    Raw,
    /// Snapshot written by the cleaning utility; already normalized
    Cleaned,
}

impl DataSource {
    pub fn name(&self) -> &'static str {
        match self {
            DataSource::Raw => "raw",
            DataSource::Cleaned => "cleaned",
        }
    }
}

/// Input and snapshot locations
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub biometric_dir: PathBuf,
    pub demographic_dir: PathBuf,
    pub enrolment_dir: PathBuf,
    pub cleaned_dir: PathBuf,
}

impl DataPaths {
    /// Whether a cleaned snapshot is present on disk
    pub fn has_cleaned_snapshot(&self) -> bool {
        self.cleaned_dir.join(BiometricRecord::SNAPSHOT_FILE).is_file()
    }
}

// ============================================================================
// DATASETS
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub biometric: Vec<BiometricRecord>,
    pub demographic: Vec<DemographicRecord>,
    pub enrolment: Vec<EnrolmentRecord>,
}

impl Datasets {
    pub fn total_records(&self) -> usize {
        self.biometric.len() + self.demographic.len() + self.enrolment.len()
    }
}

// ============================================================================
// FILE READING
// ============================================================================

/// All `*.csv` files directly under `dir`, sorted by path so concatenation order is stable
pub fn discover_csv_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::MissingDirectory(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Read one CSV file, returning its header row and every record.
/// Any malformed row (including a bad date) fails the whole file.
pub fn read_csv_file<R: Record>(path: &Path) -> Result<(csv::StringRecord, Vec<R>), LoadError> {
    let csv_err = |source: csv::Error| LoadError::Csv {
        file: path.to_path_buf(),
        source,
    };

    let mut rdr = csv::Reader::from_path(path).map_err(csv_err)?;
    let headers = rdr.headers().map_err(csv_err)?.clone();

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: R = result.map_err(csv_err)?;
        rows.push(row);
    }

    Ok((headers, rows))
}

/// Concatenate every extract of one kind. All files must share the first file's header.
pub fn concat_extracts<R: Record>(dir: &Path) -> Result<Vec<R>, LoadError> {
    let files = discover_csv_files(dir)?;
    if files.is_empty() {
        return Err(LoadError::NoInputFiles {
            kind: R::KIND,
            dir: dir.to_path_buf(),
        });
    }

    let mut expected: Option<csv::StringRecord> = None;
    let mut all = Vec::new();

    for file in &files {
        let (headers, rows) = read_csv_file::<R>(file)?;

        let first = expected.get_or_insert_with(|| headers.clone());
        if *first != headers {
            return Err(LoadError::SchemaMismatch {
                kind: R::KIND,
                file: file.clone(),
                expected: join_headers(first),
                found: join_headers(&headers),
            });
        }

        info!(kind = R::KIND, file = %file.display(), rows = rows.len(), "loaded extract");
        all.extend(rows);
    }

    Ok(all)
}

fn join_headers(headers: &csv::StringRecord) -> String {
    headers.iter().collect::<Vec<_>>().join(", ")
}

/// Apply the state normalizer to every row in place
pub fn normalize_rows<R: Record>(rows: &mut [R]) {
    for row in rows.iter_mut() {
        let slot = row.state_mut();
        *slot = normalize_state(slot.as_deref());
    }
}

fn load_raw_kind<R: Record>(dir: &Path) -> Result<Vec<R>, LoadError> {
    let mut rows = concat_extracts::<R>(dir)?;
    normalize_rows(&mut rows);
    info!(kind = R::KIND, rows = rows.len(), "dataset ready");
    Ok(rows)
}

fn load_snapshot_kind<R: Record>(cleaned_dir: &Path) -> Result<Vec<R>, LoadError> {
    let (_, rows) = read_csv_file::<R>(&cleaned_dir.join(R::SNAPSHOT_FILE))?;
    info!(kind = R::KIND, rows = rows.len(), "snapshot ready");
    Ok(rows)
}

/// Load and normalize all three raw datasets
pub fn load_raw(paths: &DataPaths) -> Result<Datasets, LoadError> {
    Ok(Datasets {
        biometric: load_raw_kind(&paths.biometric_dir)?,
        demographic: load_raw_kind(&paths.demographic_dir)?,
        enrolment: load_raw_kind(&paths.enrolment_dir)?,
    })
}

/// Load a previously cleaned snapshot as-is
pub fn load_cleaned(cleaned_dir: &Path) -> Result<Datasets, LoadError> {
    if !cleaned_dir.is_dir() {
        return Err(LoadError::MissingDirectory(cleaned_dir.to_path_buf()));
    }

    Ok(Datasets {
        biometric: load_snapshot_kind(cleaned_dir)?,
        demographic: load_snapshot_kind(cleaned_dir)?,
        enrolment: load_snapshot_kind(cleaned_dir)?,
    })
}

pub fn load(source: DataSource, paths: &DataPaths) -> Result<Datasets, LoadError> {
    match source {
        DataSource::Raw => load_raw(paths),
        DataSource::Cleaned => load_cleaned(&paths.cleaned_dir),
    }
}

// ============================================================================
// DATA STORE
// ============================================================================

/// Lifetime-scoped owner of the loaded tables.
///
/// Created once at startup and shared by reference with every handler. The first
/// successful `datasets()` call populates the cache exactly once; concurrent first
/// callers block on that single load instead of repeating it, and nobody ever sees
/// a partially populated value. A failed load leaves the store empty.
pub struct DataStore {
    source: DataSource,
    paths: DataPaths,
    cache: OnceCell<Datasets>,
}

impl DataStore {
    pub fn new(source: DataSource, paths: DataPaths) -> Self {
        DataStore {
            source,
            paths,
            cache: OnceCell::new(),
        }
    }

    /// Store pre-populated with in-memory tables (no disk access)
    pub fn with_datasets(source: DataSource, paths: DataPaths, datasets: Datasets) -> Self {
        DataStore {
            source,
            paths,
            cache: OnceCell::with_value(datasets),
        }
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    pub fn datasets(&self) -> Result<&Datasets, LoadError> {
        self.cache.get_or_try_init(|| {
            info!(source = self.source.name(), "loading datasets");
            let started = Instant::now();
            let datasets = load(self.source, &self.paths)?;
            info!(
                records = datasets.total_records(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "datasets cached"
            );
            Ok(datasets)
        })
    }
}
