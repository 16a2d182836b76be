//! Remote concept lookup.
//!
//! The resolver only sees the [`ConceptLookup`] trait; [`BrowserLookup`]
//! implements it against the NHS SNOMED CT browser.

use std::time::Duration;

use async_trait::async_trait;
use pcd_types::serde_format::{effective_time, sctid};
use pcd_types::{EffectiveTime, SctId, SimpleDefinition};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{LookupError, PipelineResult};

/// Browser API root; the edition and concept id are appended.
pub const BROWSER_BASE_URL: &str = "https://termbrowser.nhs.uk/sct-browser-api/snomed/uk-edition";

/// Resolves a single concept id to its current FSN.
#[async_trait]
pub trait ConceptLookup: Send + Sync {
    /// Fetches one concept.
    async fn lookup(&self, concept_id: SctId) -> Result<RemoteConcept, LookupError>;
}

/// The part of a browser concept the pipeline keeps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConcept {
    /// Concept id as reported by the browser.
    #[serde(with = "sctid")]
    pub concept_id: SctId,
    /// Fully Specified Name.
    pub fsn: String,
    /// Effective time of the concept row.
    #[serde(with = "effective_time")]
    pub effective_time: EffectiveTime,
    /// Whether the concept is active.
    pub active: bool,
}

impl RemoteConcept {
    /// Maps the concept to a definition. The FSN is always the main term.
    pub fn into_definition(self) -> SimpleDefinition {
        SimpleDefinition {
            term: self.fsn,
            effective_time: self.effective_time,
            is_active: self.active,
            is_main: true,
        }
    }
}

/// Client for the NHS terminology browser.
pub struct BrowserLookup {
    client: Client,
    concepts_url: String,
}

impl BrowserLookup {
    /// Creates a client for the given UK edition, e.g. `v20230927`.
    pub fn new(edition: &str) -> PipelineResult<Self> {
        Self::with_base_url(BROWSER_BASE_URL, edition)
    }

    /// Creates a client against a different browser deployment.
    pub fn with_base_url(base_url: &str, edition: &str) -> PipelineResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            concepts_url: format!("{}/{}/concepts", base_url.trim_end_matches('/'), edition),
        })
    }

    /// URL of one concept.
    pub fn concept_url(&self, concept_id: SctId) -> String {
        format!("{}/{}", self.concepts_url, concept_id)
    }
}

#[async_trait]
impl ConceptLookup for BrowserLookup {
    async fn lookup(&self, concept_id: SctId) -> Result<RemoteConcept, LookupError> {
        let response = self.client.get(self.concept_url(concept_id)).send().await?;

        if !response.status().is_success() {
            return Err(LookupError::Status {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| LookupError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_concept_from_browser_json() {
        let body = r#"{
            "conceptId": "22298006",
            "fsn": "Myocardial infarction (disorder)",
            "effectiveTime": "20020131",
            "active": true,
            "definitionStatus": "Fully defined",
            "module": "900000000000207008"
        }"#;
        let concept: RemoteConcept = serde_json::from_str(body).unwrap();
        assert_eq!(concept.concept_id, 22298006);

        let def = concept.into_definition();
        assert_eq!(def.term, "Myocardial infarction (disorder)");
        assert_eq!(def.effective_time, 20020131);
        assert!(def.is_main);
        assert!(def.is_active);
    }

    #[test]
    fn test_inactive_concept_drops_active_flag() {
        let body = r#"{"conceptId": 1, "fsn": "Retired", "effectiveTime": 20100101, "active": false}"#;
        let def = serde_json::from_str::<RemoteConcept>(body).unwrap().into_definition();
        assert_eq!(
            serde_json::to_value(&def).unwrap(),
            serde_json::json!({"t": "Retired", "e": "20100101", "m": 1})
        );
    }

    #[test]
    fn test_concept_url() {
        let lookup = BrowserLookup::with_base_url("http://localhost:9000/", "v1").unwrap();
        assert_eq!(lookup.concept_url(42), "http://localhost:9000/v1/concepts/42");
    }
}
