use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceData {
    pub countries: BTreeMap<String, String>,
    pub modes: BTreeMap<String, String>,
    pub levels: BTreeMap<String, String>,
    pub length_of_course: BTreeMap<String, String>,
    pub distance_learning: BTreeMap<String, String>,
    pub availability: BTreeMap<String, String>,
    pub unavailable_reasons: BTreeMap<String, String>,
    /// Registry names that are legitimately all uppercase.
    pub uppercase_names: Vec<String>,
    /// Words kept lowercase when title-casing, except in first position.
    pub connector_words: Vec<String>,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self {
            countries: table(&[
                ("XF", "England"),
                ("XG", "Northern Ireland"),
                ("XH", "Scotland"),
                ("XI", "Wales"),
            ]),
            modes: table(&[("1", "Full-time"), ("2", "Part-time"), ("3", "Both")]),
            levels: table(&[
                ("0", "Other undergraduate"),
                ("1", "First degree"),
                ("2", "Integrated masters"),
                ("3", "Postgraduate"),
            ]),
            length_of_course: table(&[
                ("1", "1 stage"),
                ("2", "2 stages"),
                ("3", "3 stages"),
                ("4", "4 stages"),
                ("5", "5 stages"),
                ("6", "6 stages"),
                ("7", "7 stages"),
            ]),
            distance_learning: table(&[
                ("0", "Course is available other than by distance learning"),
                ("1", "Course is only available through distance learning"),
                ("2", "Course is optionally available through distance learning"),
            ]),
            availability: table(&[
                ("0", "Not available"),
                ("1", "Optional"),
                ("2", "Compulsory"),
            ]),
            unavailable_reasons: table(&[
                (
                    "1",
                    "There is no data available for this course because it is new or has not run recently",
                ),
                (
                    "2",
                    "There were not enough students on this course to publish data",
                ),
                (
                    "3",
                    "There were not enough survey responses to publish data for this course",
                ),
                (
                    "4",
                    "The data for this course is combined with data for other courses",
                ),
            ]),
            uppercase_names: [
                "BIMM",
                "CAFRE",
                "LIPA",
                "RAU",
                "SAE",
                "SOAS",
                "UCL",
                "UWTSD",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
            connector_words: ["and", "at", "for", "in", "of", "on", "the", "upon", "with"]
                .iter()
                .map(|word| word.to_string())
                .collect(),
        }
    }
}

impl ReferenceData {
    /// Built-in tables, optionally overridden field-by-field from a JSON file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn country_name(&self, code: &str) -> Option<&str> {
        self.countries.get(code).map(String::as_str)
    }

    pub fn mode_label(&self, code: &str) -> Option<&str> {
        self.modes.get(code).map(String::as_str)
    }

    pub fn level_label(&self, code: &str) -> Option<&str> {
        self.levels.get(code).map(String::as_str)
    }

    pub fn length_label(&self, code: &str) -> Option<&str> {
        self.length_of_course.get(code).map(String::as_str)
    }

    pub fn distance_label(&self, code: &str) -> Option<&str> {
        self.distance_learning.get(code).map(String::as_str)
    }

    pub fn availability_label(&self, code: &str) -> Option<&str> {
        self.availability.get(code).map(String::as_str)
    }

    pub fn unavailable_reason(&self, code: &str) -> Option<&str> {
        self.unavailable_reasons.get(code).map(String::as_str)
    }
}

fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(code, label)| (code.to_string(), label.to_string()))
        .collect()
}
