//! Hub service registry entries.

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HubService {
    pub id: String,
    pub name: Option<String>,
    pub home_url: Option<String>,
    pub version: Option<String>,
    pub application_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServicePage {
    #[serde(default)]
    pub services: Vec<HubService>,
}

impl HubService {
    /// True when the service reports a version at or above `min_version`.
    /// Versions compare component-wise as dotted integers; a missing or unparsable version is not compatible.
    pub fn is_compatible(&self, min_version: &str) -> bool {
        match self.version.as_deref().and_then(parse_version) {
            Some(own) => parse_version(min_version).is_some_and(|min| own >= min),
            None => false,
        }
    }
}

fn parse_version(value: &str) -> Option<Vec<u32>> {
    value
        .trim()
        .split('.')
        .map(|part| part.parse::<u32>().ok())
        .collect()
}
