use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub ukprn_name: String,
    #[serde(default)]
    pub legal_name: Option<String>,
    #[serde(default)]
    pub contacts: Vec<ProviderContact>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderContact {
    /// `P` marks the primary contact; `L` a legal address.
    #[serde(default)]
    pub contact_type: Option<String>,
    #[serde(default)]
    pub address: Option<ProviderAddress>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderAddress {
    #[serde(default)]
    pub address_1: Option<String>,
    #[serde(default)]
    pub address_2: Option<String>,
    #[serde(default)]
    pub address_3: Option<String>,
    #[serde(default)]
    pub address_4: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub post_code: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderIndex {
    providers: BTreeMap<String, ProviderRecord>,
}

impl ProviderIndex {
    pub fn new(providers: BTreeMap<String, ProviderRecord>) -> Result<Self> {
        if let Some((id, _)) = providers
            .iter()
            .find(|(id, record)| id.trim().is_empty() || record.ukprn_name.trim().is_empty())
        {
            return Err(ExtractError::MalformedLookup {
                index: "registry",
                reason: format!("provider {id:?} has a blank id or ukprn_name"),
            });
        }
        Ok(Self { providers })
    }

    pub fn get(&self, id: &str) -> Option<&ProviderRecord> {
        self.providers.get(id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}
