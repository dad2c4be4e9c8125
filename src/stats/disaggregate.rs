use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::error::{ExtractError, Result};
use crate::reference::ReferenceData;
use crate::stats::fields::JOB_ENTRY;
use crate::stats::tariff::TariffClassifier;
use crate::stats::{FieldTable, StatFamily, StatisticRecord, ValueKind};
use crate::xml::{Field, RawBlock, coerce_to_sequence};

#[derive(Debug)]
pub struct StatisticsExtractor<'a> {
    reference: &'a ReferenceData,
    tariffs: TariffClassifier,
}

impl<'a> StatisticsExtractor<'a> {
    pub fn new(reference: &'a ReferenceData) -> Result<Self> {
        Ok(Self {
            reference,
            tariffs: TariffClassifier::new()?,
        })
    }

    /// Every record a course reports for `family`; empty when the family is absent.
    pub fn extract(&self, course: &RawBlock, family: StatFamily) -> Result<Vec<StatisticRecord>> {
        let table = family.table();
        let blocks = course.strict_blocks(family.element(), |_| ExtractError::UnexpectedShape {
            family,
            raw_key: family.element().to_string(),
        })?;

        let mut records = Vec::new();
        for block in blocks {
            records.extend(self.disaggregate(block, table)?);
        }
        Ok(records)
    }

    /// One record when the block carries no subject, otherwise one per subject occurrence,
    /// each sharing the block's measurements.
    pub fn disaggregate(&self, block: &RawBlock, table: &FieldTable) -> Result<Vec<StatisticRecord>> {
        let measurements = self.map_measurements(block, table)?;

        let subject_field = table
            .spec_of_kind(ValueKind::Subject)
            .and_then(|spec| block.get(spec.raw_key).map(|field| (spec, field)));

        let Some((spec, field)) = subject_field else {
            return Ok(vec![StatisticRecord::overall(measurements)]);
        };

        coerce_to_sequence(field)
            .into_iter()
            .map(|item| {
                let code = scalar(table.family, spec.raw_key, item)?;
                Ok(StatisticRecord::for_subject(code, measurements.clone()))
            })
            .collect()
    }

    /// Maps every raw field of `block` through `table`. Subject fields are left to the caller.
    pub fn map_measurements(
        &self,
        block: &RawBlock,
        table: &FieldTable,
    ) -> Result<BTreeMap<String, Value>> {
        let family = table.family;
        if let Some(missing) = table.mandatory().find(|spec| !block.contains(spec.raw_key)) {
            return Err(ExtractError::MissingMandatoryField {
                family,
                raw_key: missing.raw_key,
            });
        }

        let mut measurements = BTreeMap::new();
        let mut tariffs = Vec::new();
        let mut jobs = Vec::new();

        for (raw_key, field) in block.iter() {
            let spec = table.resolve(raw_key)?;
            let value = match spec.kind {
                ValueKind::Subject => continue,
                ValueKind::Count => Value::from(parse_count(family, raw_key, field)?),
                ValueKind::Text => Value::from(scalar(family, raw_key, field)?),
                ValueKind::Unavailable => self.unavailable(scalar(family, raw_key, field)?),
                ValueKind::Mode => {
                    let code = scalar(family, raw_key, field)?;
                    coded(code, self.reference.mode_label(code))
                }
                ValueKind::Level => {
                    let code = scalar(family, raw_key, field)?;
                    coded(code, self.reference.level_label(code))
                }
                ValueKind::TariffBand => {
                    let band = self.tariffs.classify(raw_key).ok_or_else(|| {
                        ExtractError::UnknownField {
                            family,
                            raw_key: raw_key.to_string(),
                        }
                    })?;
                    tariffs.push((band, parse_count(family, raw_key, field)?));
                    continue;
                }
                ValueKind::JobList => {
                    for entry in coerce_to_sequence(field) {
                        let entry = entry.as_block().ok_or_else(|| ExtractError::UnexpectedShape {
                            family,
                            raw_key: raw_key.to_string(),
                        })?;
                        jobs.push(self.map_measurements(entry, &JOB_ENTRY)?);
                    }
                    continue;
                }
            };
            measurements.insert(spec.semantic_key.to_string(), value);
        }

        if !tariffs.is_empty() {
            tariffs.sort_by_key(|(band, _)| band.floor);
            let tariffs = tariffs
                .into_iter()
                .map(|(band, entrants)| {
                    json!({
                        "code": band.code(),
                        "description": band.description(),
                        "entrants": entrants,
                    })
                })
                .collect::<Vec<_>>();
            measurements.insert("tariffs".to_string(), Value::from(tariffs));
        }

        if !jobs.is_empty() {
            jobs.sort_by_key(|job| job.get("order").and_then(Value::as_i64));
            let jobs = jobs
                .into_iter()
                .map(|job| Value::Object(job.into_iter().collect::<Map<_, _>>()))
                .collect::<Vec<_>>();
            measurements.insert("job_list".to_string(), Value::from(jobs));
        }

        Ok(measurements)
    }

    fn unavailable(&self, code: &str) -> Value {
        let mut unavailable = Map::new();
        unavailable.insert("code".to_string(), Value::from(code));
        if let Some(reason) = self.reference.unavailable_reason(code) {
            unavailable.insert("reason".to_string(), Value::from(reason));
        }
        Value::Object(unavailable)
    }
}

pub(crate) fn coded(code: &str, label: Option<&str>) -> Value {
    let mut value = Map::new();
    value.insert("code".to_string(), Value::from(code));
    if let Some(label) = label {
        value.insert("label".to_string(), Value::from(label));
    }
    Value::Object(value)
}

fn scalar<'f>(family: StatFamily, raw_key: &str, field: &'f Field) -> Result<&'f str> {
    field.as_text().ok_or_else(|| ExtractError::UnexpectedShape {
        family,
        raw_key: raw_key.to_string(),
    })
}

fn parse_count(family: StatFamily, raw_key: &str, field: &Field) -> Result<i64> {
    let text = scalar(family, raw_key, field)?;
    text.parse::<i64>().map_err(|_| ExtractError::InvalidValue {
        family,
        raw_key: raw_key.to_string(),
        value: text.to_string(),
    })
}
