use std::collections::BTreeMap;

use serde::Serialize;

use crate::registry::{ProviderAddress, ProviderContact, ProviderIndex, ProviderRecord};

pub const NO_WEBSITE: &str = "No website available";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactDetails {
    /// Populated address lines only, keyed `line_1`..`line_5`; gaps are kept.
    pub address: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    pub website: String,
}

pub fn get_contact_details(id: &str, providers: &ProviderIndex) -> Option<ContactDetails> {
    providers.get(id).map(contact_details)
}

pub fn contact_details(record: &ProviderRecord) -> ContactDetails {
    let contact = primary_contact(&record.contacts);
    let address = contact.and_then(|contact| contact.address.as_ref());

    ContactDetails {
        address: address.map(address_lines).unwrap_or_default(),
        post_code: address
            .and_then(|address| non_empty(address.post_code.as_deref()))
            .map(ToOwned::to_owned),
        telephone: contact.and_then(|contact| contact.telephone.clone()),
        website: record
            .contacts
            .iter()
            .find_map(|contact| non_empty(contact.website.as_deref()))
            .unwrap_or(NO_WEBSITE)
            .to_string(),
    }
}

/// The primary (`P`) contact, else the first contact carrying an address.
fn primary_contact(contacts: &[ProviderContact]) -> Option<&ProviderContact> {
    contacts
        .iter()
        .find(|contact| contact.contact_type.as_deref() == Some("P"))
        .or_else(|| contacts.iter().find(|contact| contact.address.is_some()))
}

fn address_lines(address: &ProviderAddress) -> BTreeMap<String, String> {
    let slots = [
        &address.address_1,
        &address.address_2,
        &address.address_3,
        &address.address_4,
        &address.town,
    ];

    slots
        .into_iter()
        .enumerate()
        .filter_map(|(index, line)| {
            non_empty(line.as_deref()).map(|text| (format!("line_{}", index + 1), text.to_string()))
        })
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(contacts: Vec<ProviderContact>) -> ProviderRecord {
        ProviderRecord {
            ukprn_name: "BEXHILL COLLEGE".to_string(),
            legal_name: None,
            contacts,
        }
    }

    #[test]
    fn address_keeps_slot_positions_with_gaps() {
        let contact = ProviderContact {
            contact_type: Some("P".to_string()),
            address: Some(ProviderAddress {
                address_1: Some("   ".to_string()),
                address_2: Some("Penland Road".to_string()),
                address_3: Some("Bexhill-on-Sea".to_string()),
                ..ProviderAddress::default()
            }),
            ..ProviderContact::default()
        };

        let details = contact_details(&record(vec![contact]));
        assert_eq!(details.address.keys().collect::<Vec<_>>(), vec!["line_2", "line_3"]);
        assert_eq!(details.address["line_2"], "Penland Road");
    }

    #[test]
    fn missing_website_uses_sentinel() {
        let contact = ProviderContact {
            contact_type: Some("P".to_string()),
            telephone: Some("01424 214545".to_string()),
            ..ProviderContact::default()
        };

        let details = contact_details(&record(vec![contact]));
        assert_eq!(details.website, NO_WEBSITE);
        assert_eq!(details.telephone.as_deref(), Some("01424 214545"));
        assert!(details.address.is_empty());
    }

    #[test]
    fn website_is_first_non_empty_across_contacts() {
        let contacts = vec![
            ProviderContact {
                contact_type: Some("P".to_string()),
                website: Some(String::new()),
                ..ProviderContact::default()
            },
            ProviderContact {
                contact_type: Some("L".to_string()),
                website: Some("www.bexhillcollege.ac.uk".to_string()),
                ..ProviderContact::default()
            },
        ];

        let details = contact_details(&record(contacts));
        assert_eq!(details.website, "www.bexhillcollege.ac.uk");
    }

    #[test]
    fn primary_contact_address_is_preferred() {
        let legal = ProviderContact {
            contact_type: Some("L".to_string()),
            address: Some(ProviderAddress {
                address_1: Some("Legal House".to_string()),
                ..ProviderAddress::default()
            }),
            ..ProviderContact::default()
        };
        let primary = ProviderContact {
            contact_type: Some("P".to_string()),
            address: Some(ProviderAddress {
                town: Some("Bexhill".to_string()),
                post_code: Some("TN40 2JG".to_string()),
                ..ProviderAddress::default()
            }),
            ..ProviderContact::default()
        };

        let details = contact_details(&record(vec![legal, primary]));
        assert_eq!(details.address.keys().collect::<Vec<_>>(), vec!["line_5"]);
        assert_eq!(details.post_code.as_deref(), Some("TN40 2JG"));
    }

    #[test]
    fn unknown_provider_has_no_contact_details() {
        let index = ProviderIndex::default();
        assert!(get_contact_details("10000001", &index).is_none());
    }
}
