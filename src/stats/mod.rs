use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

mod disaggregate;
mod fields;
mod sector;
mod tariff;

pub use disaggregate::StatisticsExtractor;
pub use fields::{FieldTable, ValueKind};
pub use sector::{SectorKey, SectorMatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatFamily {
    Continuation,
    Entry,
    Employment,
    JobType,
    JobList,
    Salary,
    Nss,
    NhsNss,
    Tariff,
    Leo3,
    Leo5,
    GoSalary,
    GoSalarySector,
    Leo3Sector,
    Leo5Sector,
    SalarySector,
}

impl StatFamily {
    /// Course-level families, in the order they appear in a course document.
    pub const COURSE: [StatFamily; 12] = [
        StatFamily::Continuation,
        StatFamily::Employment,
        StatFamily::Entry,
        StatFamily::GoSalary,
        StatFamily::JobList,
        StatFamily::JobType,
        StatFamily::Leo3,
        StatFamily::Leo5,
        StatFamily::NhsNss,
        StatFamily::Nss,
        StatFamily::Salary,
        StatFamily::Tariff,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Continuation => "continuation",
            Self::Entry => "entry",
            Self::Employment => "employment",
            Self::JobType => "job_type",
            Self::JobList => "job_list",
            Self::Salary => "salary",
            Self::Nss => "nss",
            Self::NhsNss => "nhs_nss",
            Self::Tariff => "tariff",
            Self::Leo3 => "leo3",
            Self::Leo5 => "leo5",
            Self::GoSalary => "go_salary",
            Self::GoSalarySector => "go_salary_sector",
            Self::Leo3Sector => "leo3_sector",
            Self::Leo5Sector => "leo5_sector",
            Self::SalarySector => "salary_sector",
        }
    }

    pub fn element(self) -> &'static str {
        match self {
            Self::Continuation => "CONTINUATION",
            Self::Entry => "ENTRY",
            Self::Employment => "EMPLOYMENT",
            Self::JobType => "JOBTYPE",
            Self::JobList => "COMMON",
            Self::Salary => "SALARY",
            Self::Nss => "NSS",
            Self::NhsNss => "NHSNSS",
            Self::Tariff => "TARIFF",
            Self::Leo3 => "LEO3",
            Self::Leo5 => "LEO5",
            Self::GoSalary => "GOSALARY",
            Self::GoSalarySector => "GOSECSAL",
            Self::Leo3Sector => "LEO3SEC",
            Self::Leo5Sector => "LEO5SEC",
            Self::SalarySector => "SECTORSAL",
        }
    }

    pub fn document_key(self) -> &'static str {
        match self {
            Self::Salary => "salaries_inst",
            Self::GoSalary => "go_salary_inst",
            Self::Leo3 => "leo3_inst",
            Self::Leo5 => "leo5_inst",
            Self::SalarySector => "salaries_sector",
            Self::GoSalarySector => "go_salary_sector",
            Self::Leo3Sector => "leo3_sector",
            Self::Leo5Sector => "leo5_sector",
            other => other.as_str(),
        }
    }

    pub fn table(self) -> &'static FieldTable {
        fields::table_for(self)
    }

    /// The sector reference collection a course-level family is compared against.
    pub fn sector(self) -> Option<StatFamily> {
        match self {
            Self::GoSalary => Some(Self::GoSalarySector),
            Self::Leo3 => Some(Self::Leo3Sector),
            Self::Leo5 => Some(Self::Leo5Sector),
            Self::Salary => Some(Self::SalarySector),
            _ => None,
        }
    }
}

impl fmt::Display for StatFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationLevel {
    Overall,
    Subject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectCode {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticRecord {
    aggregation_level: AggregationLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<SubjectCode>,
    #[serde(flatten)]
    measurements: BTreeMap<String, Value>,
}

impl StatisticRecord {
    pub fn overall(measurements: BTreeMap<String, Value>) -> Self {
        Self {
            aggregation_level: AggregationLevel::Overall,
            subject: None,
            measurements,
        }
    }

    pub fn for_subject(code: &str, measurements: BTreeMap<String, Value>) -> Self {
        Self {
            aggregation_level: AggregationLevel::Subject,
            subject: Some(SubjectCode {
                code: code.to_string(),
            }),
            measurements,
        }
    }

    pub fn aggregation_level(&self) -> AggregationLevel {
        self.aggregation_level
    }

    pub fn subject_code(&self) -> Option<&str> {
        self.subject.as_ref().map(|subject| subject.code.as_str())
    }

    #[cfg(test)]
    pub fn measurement(&self, key: &str) -> Option<&Value> {
        self.measurements.get(key)
    }

    #[cfg(test)]
    pub fn measurement_keys(&self) -> impl Iterator<Item = &str> {
        self.measurements.keys().map(String::as_str)
    }
}
