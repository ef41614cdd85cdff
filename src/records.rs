// 📄 Raw Record Kinds
// One row per (state, district, pincode, date) in the UIDAI CSV extracts

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ============================================================================
// DATE CODEC
// ============================================================================

/// `DD-MM-YYYY` dates, as found in every extract and written back to snapshots
pub mod date_format {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%d-%m-%Y";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(raw.trim(), FORMAT).map_err(|e| {
            serde::de::Error::custom(format!("invalid date {:?} (expected DD-MM-YYYY): {}", raw, e))
        })
    }
}

// ============================================================================
// RECORD TRAIT
// ============================================================================

/// Shared view over the three record kinds so loading and grouping are written once
pub trait Record: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Human-readable dataset name ("biometric", ...)
    const KIND: &'static str;

    /// File name used in the cleaned snapshot directory
    const SNAPSHOT_FILE: &'static str;

    fn state(&self) -> Option<&str>;
    fn state_mut(&mut self) -> &mut Option<String>;
    fn district(&self) -> &str;
    fn pincode(&self) -> &str;
    fn date(&self) -> NaiveDate;

    /// (ages 5-17, older bracket)
    fn counts(&self) -> (u64, u64);
}

// ============================================================================
// BIOMETRIC
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiometricRecord {
    pub state: Option<String>,
    pub district: String,
    pub pincode: String,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    pub bio_age_5_17: u64,
    pub bio_age_17_: u64,
}

impl Record for BiometricRecord {
    const KIND: &'static str = "biometric";
    const SNAPSHOT_FILE: &'static str = "biometric_cleaned.csv";

    fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    fn state_mut(&mut self) -> &mut Option<String> {
        &mut self.state
    }

    fn district(&self) -> &str {
        &self.district
    }

    fn pincode(&self) -> &str {
        &self.pincode
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn counts(&self) -> (u64, u64) {
        (self.bio_age_5_17, self.bio_age_17_)
    }
}

// ============================================================================
// DEMOGRAPHIC
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicRecord {
    pub state: Option<String>,
    pub district: String,
    pub pincode: String,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    pub demo_age_5_17: u64,
    pub demo_age_17_: u64,
}

impl Record for DemographicRecord {
    const KIND: &'static str = "demographic";
    const SNAPSHOT_FILE: &'static str = "demographic_cleaned.csv";

    fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    fn state_mut(&mut self) -> &mut Option<String> {
        &mut self.state
    }

    fn district(&self) -> &str {
        &self.district
    }

    fn pincode(&self) -> &str {
        &self.pincode
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn counts(&self) -> (u64, u64) {
        (self.demo_age_5_17, self.demo_age_17_)
    }
}

// ============================================================================
// ENROLMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolmentRecord {
    pub state: Option<String>,
    pub district: String,
    pub pincode: String,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    pub age_5_17: u64,
    pub age_18_greater: u64,
}

impl Record for EnrolmentRecord {
    const KIND: &'static str = "enrolment";
    const SNAPSHOT_FILE: &'static str = "enrolment_cleaned.csv";

    fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    fn state_mut(&mut self) -> &mut Option<String> {
        &mut self.state
    }

    fn district(&self) -> &str {
        &self.district
    }

    fn pincode(&self) -> &str {
        &self.pincode
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn counts(&self) -> (u64, u64) {
        (self.age_5_17, self.age_18_greater)
    }
}
