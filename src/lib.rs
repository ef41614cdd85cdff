// Youth Transition - Core Library
// Exposes the cleaning and aggregation pipeline for the CLI, the API server, and tests

pub mod error;
pub mod normalizer;
pub mod records;
pub mod loader;
pub mod aggregate;
pub mod risk;
pub mod query;
pub mod cleaning;
pub mod config;
pub mod logging;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{LoadError, QueryError};
pub use normalizer::{canonical_state, normalize_state, STATE_VARIANTS};
pub use records::{BiometricRecord, DemographicRecord, EnrolmentRecord, Record};
pub use loader::{
    DataPaths, DataSource, DataStore, Datasets,
    load, load_raw, load_cleaned,
};
pub use aggregate::{
    Analysis, MonthlyTrend, RegionSummary,
    monthly_trend, summarize_states, youth_share,
};
pub use risk::RiskTier;
pub use query::{
    Overview,
    overview, risk_distribution, top_performers, bottom_performers, state_detail,
};
pub use cleaning::{CleaningReport, run_cleaning};
pub use config::{DataConfig, SourceMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
