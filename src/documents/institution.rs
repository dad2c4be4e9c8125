use serde::Serialize;
use tracing::warn;

use super::{CodedLabel, DocumentAssembler, InstitutionContext};
use crate::contact::{ContactDetails, get_contact_details};
use crate::error::Result;
use crate::util::sha256_text;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionDocument {
    pub id: String,
    pub created_at: String,
    pub version: u32,
    pub institution_id: String,
    pub institution: Institution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Institution {
    pub pub_ukprn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_ukprn_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    pub ukprn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<CodedLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_details: Option<ContactDetails>,
    pub total_number_of_courses: usize,
}

impl<'d> DocumentAssembler<'d> {
    pub fn assemble_institution(&self, institution: &InstitutionContext<'d>) -> Result<InstitutionDocument> {
        let registry = self.providers.get(institution.pub_ukprn);
        if registry.is_none() {
            warn!(pub_ukprn = institution.pub_ukprn, "provider missing from registry enrichment");
        }

        let country = institution
            .block
            .non_empty_text("COUNTRY")
            .map(|code| CodedLabel::new(code, self.reference.country_name(code)));

        Ok(InstitutionDocument {
            id: sha256_text(institution.pub_ukprn),
            created_at: self.options.created_at.clone(),
            version: self.options.version,
            institution_id: institution.pub_ukprn.to_string(),
            institution: Institution {
                pub_ukprn: institution.pub_ukprn.to_string(),
                pub_ukprn_name: registry.map(|record| self.names.normalize(&record.ukprn_name)),
                legal_name: registry
                    .and_then(|record| record.legal_name.as_deref())
                    .map(|name| self.names.normalize(name)),
                ukprn: institution.ukprn.to_string(),
                country,
                contact_details: get_contact_details(institution.pub_ukprn, self.providers),
                total_number_of_courses: institution.courses().len(),
            },
        })
    }
}
