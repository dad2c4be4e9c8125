use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use super::{BilingualText, CodedLabel, DocumentAssembler, InstitutionContext, identifier, owned};
use crate::error::{ExtractError, Result};
use crate::stats::{SectorKey, StatFamily, StatisticRecord, SubjectCode};
use crate::util::sha256_text;
use crate::xml::RawBlock;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseDocument {
    pub id: String,
    pub created_at: String,
    pub version: u32,
    pub institution_id: String,
    pub course_id: String,
    pub course_mode: String,
    pub course: Course,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    pub accreditations: Vec<Accreditation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<CodedLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_learning: Option<CodedLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foundation_year_availability: Option<CodedLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honours_award_provision: Option<bool>,
    pub institution: CourseInstitution,
    pub kis_course_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_of_course: Option<CodedLabel>,
    pub links: CourseLinks,
    pub locations: Vec<CourseLocation>,
    pub mode: CodedLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nhs_funded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<Qualification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandwich_year: Option<CodedLabel>,
    pub subjects: Vec<SubjectCode>,
    pub title: BilingualText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ucas_programme_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_abroad: Option<CodedLabel>,
    pub statistics: BTreeMap<&'static str, Vec<StatisticRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseInstitution {
    pub pub_ukprn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_ukprn_name: Option<String>,
    pub ukprn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ukprn_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CourseLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_support_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_and_teaching_methods: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Accreditation {
    #[serde(rename = "type")]
    pub accreditation_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accreditor_url: Option<String>,
    pub dependent_on_taking_module: bool,
    pub text: BilingualText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<BilingualText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accommodation_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_union_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ucas_course_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Qualification {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl<'d> DocumentAssembler<'d> {
    pub fn assemble_course(
        &self,
        institution: &InstitutionContext<'d>,
        course: &'d RawBlock,
    ) -> Result<CourseDocument> {
        let course_id = required(course, "KISCOURSEID")?;
        let mode = required(course, "KISMODE")?;
        let reference = self.reference;

        let teaching_ukprn = course.non_empty_text("UKPRN").unwrap_or(institution.ukprn);
        let country = institution
            .block
            .non_empty_text("COUNTRY")
            .map(|code| CodedLabel::new(code, reference.country_name(code)));

        let body = Course {
            accreditations: self.accreditations(course)?,
            country,
            distance_learning: course
                .non_empty_text("DISTANCE")
                .map(|code| CodedLabel::new(code, reference.distance_label(code))),
            foundation_year_availability: self.availability(course, "FOUNDATION"),
            honours_award_provision: flag(course, "HONOURS"),
            institution: CourseInstitution {
                pub_ukprn: institution.pub_ukprn.to_string(),
                pub_ukprn_name: self.provider_name(institution.pub_ukprn),
                ukprn: teaching_ukprn.to_string(),
                ukprn_name: self.provider_name(teaching_ukprn),
            },
            kis_course_id: course_id.to_string(),
            length_of_course: course
                .non_empty_text("NUMSTAGES")
                .map(|code| CodedLabel::new(code, reference.length_label(code))),
            links: CourseLinks {
                assessment_method: owned(course.non_empty_text("ASSURL")),
                course_page: owned(course.non_empty_text("CRSEURL")),
                employment_details: owned(course.non_empty_text("EMPLOYURL")),
                financial_support_details: owned(course.non_empty_text("SUPPORTURL")),
                learning_and_teaching_methods: owned(course.non_empty_text("LTURL")),
            },
            locations: self.locations(institution, course)?,
            mode: CodedLabel::new(mode, reference.mode_label(mode)),
            nhs_funded: flag(course, "NHS"),
            qualification: self.qualification(course),
            sandwich_year: self.availability(course, "SANDWICH"),
            subjects: course
                .texts("SBJ")
                .into_iter()
                .map(|code| SubjectCode {
                    code: code.to_string(),
                })
                .collect(),
            title: BilingualText::from_block(course, "TITLE", "TITLEW"),
            ucas_programme_id: owned(course.non_empty_text("UCASPROGID")),
            year_abroad: self.availability(course, "YEARABROAD"),
            statistics: self.statistics(course, mode)?,
        };

        Ok(CourseDocument {
            id: sha256_text(&format!("{}:{course_id}:{mode}", institution.pub_ukprn)),
            created_at: self.options.created_at.clone(),
            version: self.options.version,
            institution_id: institution.pub_ukprn.to_string(),
            course_id: course_id.to_string(),
            course_mode: mode.to_string(),
            course: body,
        })
    }

    /// Every course statistic family plus the sector comparators matched against them.
    fn statistics(
        &self,
        course: &RawBlock,
        mode: &str,
    ) -> Result<BTreeMap<&'static str, Vec<StatisticRecord>>> {
        let level = course.non_empty_text("KISLEVEL");
        let mut statistics = BTreeMap::new();

        for family in StatFamily::COURSE {
            let records = self.extractor.extract(course, family)?;

            if let Some(sector_family) = family.sector() {
                let comparators = match level {
                    Some(level) => self.sector_comparators(sector_family, &records, mode, level)?,
                    None => Vec::new(),
                };
                statistics.insert(sector_family.document_key(), comparators);
            }

            statistics.insert(family.document_key(), records);
        }

        Ok(statistics)
    }

    fn sector_comparators(
        &self,
        sector_family: StatFamily,
        records: &[StatisticRecord],
        mode: &str,
        level: &str,
    ) -> Result<Vec<StatisticRecord>> {
        let Some(matcher) = self.sectors.get(sector_family) else {
            return Ok(Vec::new());
        };
        let table = sector_family.table();
        let subjects = records
            .iter()
            .filter_map(StatisticRecord::subject_code)
            .collect::<Vec<_>>();

        let matched = if sector_family == StatFamily::SalarySector {
            matcher.match_many(mode, level, &subjects)
        } else {
            subjects
                .iter()
                .map(|subject| matcher.match_single(&SectorKey::new(subject, mode, level)))
                .collect()
        };

        let mut comparators = Vec::new();
        for record in matched.into_iter().flatten() {
            comparators.extend(self.extractor.disaggregate(record.block, table)?);
        }
        Ok(comparators)
    }

    fn accreditations(&self, course: &RawBlock) -> Result<Vec<Accreditation>> {
        let entries = course.strict_blocks("ACCREDITATION", |position| {
            ExtractError::TextInsteadOfRecord {
                element: "ACCREDITATION",
                position,
            }
        })?;

        let accreditations = entries
            .into_iter()
            .filter_map(|entry| {
                let Some(accreditation_type) = entry.non_empty_text("ACCTYPE") else {
                    warn!("course accreditation without ACCTYPE skipped");
                    return None;
                };
                let text = match self.accreditations.get(accreditation_type) {
                    Some(table_entry) => BilingualText::from_block(table_entry, "ACCTEXT", "ACCTEXTW"),
                    None => {
                        warn!(accreditation_type, "accreditation type not in accreditation table");
                        BilingualText {
                            english: None,
                            welsh: None,
                        }
                    }
                };
                Some(Accreditation {
                    accreditation_type: accreditation_type.to_string(),
                    accreditor_url: owned(entry.non_empty_text("ACCDEPENDURL")),
                    dependent_on_taking_module: entry.text("ACCDEPEND") == Some("1"),
                    text,
                })
            })
            .collect::<Vec<_>>();
        Ok(accreditations)
    }

    fn locations(
        &self,
        institution: &InstitutionContext<'d>,
        course: &RawBlock,
    ) -> Result<Vec<CourseLocation>> {
        let entries = course.strict_blocks("COURSELOCATION", |position| {
            ExtractError::TextInsteadOfRecord {
                element: "COURSELOCATION",
                position,
            }
        })?;

        let locations = entries
            .into_iter()
            .map(|entry| {
                let id = entry.non_empty_text("LOCID");
                let location = id.and_then(|id| {
                    let found = institution.locations.get(id).copied();
                    if found.is_none() {
                        warn!(location_id = id, pub_ukprn = institution.pub_ukprn, "course location not found");
                    }
                    found
                });

                CourseLocation {
                    id: owned(id),
                    name: location.map(|block| BilingualText::from_block(block, "LOCNAME", "LOCNAMEW")),
                    latitude: owned(location.and_then(|block| block.non_empty_text("LATITUDE"))),
                    longitude: owned(location.and_then(|block| block.non_empty_text("LONGITUDE"))),
                    accommodation_url: owned(location.and_then(|block| block.non_empty_text("ACCOMURL"))),
                    student_union_url: owned(location.and_then(|block| block.non_empty_text("SUURL"))),
                    ucas_course_id: owned(entry.non_empty_text("UCASCOURSEID")),
                }
            })
            .collect::<Vec<_>>();
        Ok(locations)
    }

    fn qualification(&self, course: &RawBlock) -> Option<Qualification> {
        let code = course.non_empty_text("KISAIMCODE")?;
        let label = self.kis_aims.get(code).cloned();
        if label.is_none() {
            warn!(kis_aim_code = code, "qualification aim not in KISAIM table");
        }

        Some(Qualification {
            code: code.to_string(),
            label,
            level: self.qualification_levels.get(code).cloned(),
        })
    }

    fn availability(&self, course: &RawBlock, key: &str) -> Option<CodedLabel> {
        course
            .non_empty_text(key)
            .map(|code| CodedLabel::new(code, self.reference.availability_label(code)))
    }
}

fn required<'b>(course: &'b RawBlock, field: &'static str) -> Result<&'b str> {
    identifier(course, "course", field)
}

fn flag(course: &RawBlock, key: &str) -> Option<bool> {
    match course.non_empty_text(key)? {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}
