use serde::Serialize;
use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::lookup::{LookupIndex, build_accreditations, build_kis_aims, build_locations};
use crate::naming::NameNormalizer;
use crate::reference::ReferenceData;
use crate::registry::ProviderIndex;
use crate::stats::{SectorMatcher, StatFamily, StatisticsExtractor};
use crate::util::is_path_segment;
use crate::xml::RawBlock;

mod course;
mod institution;

pub use course::CourseDocument;
pub use institution::InstitutionDocument;

#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    pub version: u32,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodedLabel {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl CodedLabel {
    fn new(code: &str, label: Option<&str>) -> Self {
        Self {
            code: code.to_string(),
            label: label.map(ToOwned::to_owned),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BilingualText {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub welsh: Option<String>,
}

impl BilingualText {
    fn from_block(block: &RawBlock, english_key: &str, welsh_key: &str) -> Self {
        Self {
            english: owned(block.non_empty_text(english_key)),
            welsh: owned(block.non_empty_text(welsh_key)),
        }
    }
}

#[derive(Debug)]
struct SectorMatchers<'d> {
    go_salary: SectorMatcher<'d>,
    leo3: SectorMatcher<'d>,
    leo5: SectorMatcher<'d>,
    salary: SectorMatcher<'d>,
}

impl<'d> SectorMatchers<'d> {
    fn get(&self, family: StatFamily) -> Option<&SectorMatcher<'d>> {
        match family {
            StatFamily::GoSalarySector => Some(&self.go_salary),
            StatFamily::Leo3Sector => Some(&self.leo3),
            StatFamily::Leo5Sector => Some(&self.leo5),
            StatFamily::SalarySector => Some(&self.salary),
            _ => None,
        }
    }
}

/// Identifiers and per-institution lookups shared by every course of one institution.
#[derive(Debug)]
pub struct InstitutionContext<'d> {
    pub block: &'d RawBlock,
    pub pub_ukprn: &'d str,
    pub ukprn: &'d str,
    locations: LookupIndex<&'d RawBlock>,
}

impl<'d> InstitutionContext<'d> {
    pub fn courses(&self) -> Vec<&'d RawBlock> {
        self.block.blocks("KISCOURSE")
    }
}

#[derive(Debug)]
pub struct DocumentAssembler<'d> {
    root: &'d RawBlock,
    reference: &'d ReferenceData,
    providers: &'d ProviderIndex,
    qualification_levels: &'d LookupIndex<String>,
    options: AssemblyOptions,
    extractor: StatisticsExtractor<'d>,
    names: NameNormalizer<'d>,
    accreditations: LookupIndex<&'d RawBlock>,
    kis_aims: LookupIndex<String>,
    sectors: SectorMatchers<'d>,
}

impl<'d> DocumentAssembler<'d> {
    pub fn new(
        root: &'d RawBlock,
        reference: &'d ReferenceData,
        providers: &'d ProviderIndex,
        qualification_levels: &'d LookupIndex<String>,
        options: AssemblyOptions,
    ) -> Result<Self> {
        let accreditations = build_accreditations(root)?;
        let kis_aims = build_kis_aims(root)?;
        let sectors = SectorMatchers {
            go_salary: SectorMatcher::new(StatFamily::GoSalarySector, root),
            leo3: SectorMatcher::new(StatFamily::Leo3Sector, root),
            leo5: SectorMatcher::new(StatFamily::Leo5Sector, root),
            salary: SectorMatcher::new(StatFamily::SalarySector, root),
        };

        debug!(
            accreditations = accreditations.len(),
            kis_aims = kis_aims.len(),
            go_salary_sector = sectors.go_salary.len(),
            leo3_sector = sectors.leo3.len(),
            leo5_sector = sectors.leo5.len(),
            salary_sector = sectors.salary.len(),
            "built document lookups"
        );

        Ok(Self {
            root,
            reference,
            providers,
            qualification_levels,
            options,
            extractor: StatisticsExtractor::new(reference)?,
            names: NameNormalizer::new(reference),
            accreditations,
            kis_aims,
            sectors,
        })
    }

    pub fn institutions(&self) -> Vec<&'d RawBlock> {
        self.root.blocks("INSTITUTION")
    }

    pub fn institution_context(&self, block: &'d RawBlock) -> Result<InstitutionContext<'d>> {
        let pub_ukprn = identifier(block, "institution", "PUBUKPRN")?;
        let ukprn = identifier(block, "institution", "UKPRN")?;

        Ok(InstitutionContext {
            block,
            pub_ukprn,
            ukprn,
            locations: build_locations(block)?,
        })
    }

    fn provider_name(&self, id: &str) -> Option<String> {
        self.providers
            .get(id)
            .map(|record| self.names.normalize(&record.ukprn_name))
    }
}

/// Non-blank identifier text that is also usable as a file name.
fn identifier<'b>(block: &'b RawBlock, entity: &'static str, field: &'static str) -> Result<&'b str> {
    let value = block
        .non_empty_text(field)
        .ok_or(ExtractError::MissingIdentifier { entity, field })?;
    if !is_path_segment(value) {
        return Err(ExtractError::UnsafeIdentifier {
            entity,
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(ToOwned::to_owned)
}
