use heroes_config::shared::SourceApiConfig;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::IngestResult;
use crate::source::base::RecordSource;
use crate::types::{HeroRecord, PersonId};

/// Value of the top-level `message` field that marks a successful lookup.
const SUCCESS_MESSAGE: &str = "ok";

/// Fetches person records from the remote people API over HTTP.
///
/// One [`Client`] is shared across all concurrent fetches of a window; it is only used to
/// issue requests and never mutated, so no synchronization beyond the client's own is
/// needed.
#[derive(Debug, Clone)]
pub struct HttpRecordSource {
    client: Client,
    base_url: String,
}

impl HttpRecordSource {
    /// Creates a source for the API described by `config`.
    pub fn new(config: &SourceApiConfig) -> IngestResult<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }
}

impl RecordSource for HttpRecordSource {
    fn name() -> &'static str {
        "people-api"
    }

    async fn fetch(&self, id: PersonId) -> IngestResult<Option<HeroRecord>> {
        debug!(person_id = id, "fetching person");

        let url = format!("{}/people/{id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let payload = response.json::<Value>().await?;

        Ok(parse_person_payload(id, &payload))
    }
}

/// Wire shape of the nested `result.properties` object.
///
/// Every attribute is optional; fields the API does not return stay unset. Unknown fields
/// are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PersonProperties {
    birth_year: Option<String>,
    eye_color: Option<String>,
    films: Option<String>,
    gender: Option<String>,
    hair_color: Option<String>,
    height: Option<String>,
    homeworld: Option<String>,
    mass: Option<String>,
    name: Option<String>,
    skin_color: Option<String>,
    species: Option<String>,
    starships: Option<String>,
    vehicles: Option<Vec<String>>,
}

impl PersonProperties {
    fn into_record(self, id: PersonId) -> HeroRecord {
        HeroRecord {
            id,
            birth_year: self.birth_year,
            eye_color: self.eye_color,
            films: self.films,
            gender: self.gender,
            hair_color: self.hair_color,
            height: self.height,
            homeworld: self.homeworld,
            mass: self.mass,
            name: self.name,
            skin_color: self.skin_color,
            species: self.species,
            starships: self.starships,
            vehicles: self.vehicles,
        }
    }
}

/// Extracts a [`HeroRecord`] from a people API response envelope.
///
/// Returns [`None`] when the envelope has no success marker or the nested properties
/// object is missing or malformed. Those cases mean "no record produced" and are only
/// logged; they never fail the surrounding window.
fn parse_person_payload(id: PersonId, payload: &Value) -> Option<HeroRecord> {
    if payload.get("message").and_then(Value::as_str) != Some(SUCCESS_MESSAGE) {
        info!(person_id = id, "person not found");
        return None;
    }

    let Some(properties) = payload.pointer("/result/properties") else {
        warn!(person_id = id, "success envelope without a properties object");
        return None;
    };

    match PersonProperties::deserialize(properties) {
        Ok(properties) => Some(properties.into_record(id)),
        Err(error) => {
            warn!(person_id = id, %error, "malformed properties object");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_success_envelope() {
        let payload = json!({
            "message": "ok",
            "result": {
                "properties": {
                    "name": "Luke Skywalker",
                    "birth_year": "19BBY",
                    "height": "172",
                    "vehicles": ["Snowspeeder", "Imperial Speeder Bike"],
                }
            }
        });

        let record = parse_person_payload(1, &payload).unwrap();

        assert_eq!(record.id, 1);
        assert_eq!(record.name.as_deref(), Some("Luke Skywalker"));
        assert_eq!(record.birth_year.as_deref(), Some("19BBY"));
        assert_eq!(record.height.as_deref(), Some("172"));
        assert_eq!(
            record.vehicles,
            Some(vec![
                "Snowspeeder".to_string(),
                "Imperial Speeder Bike".to_string()
            ])
        );
        // Attributes the API did not return stay unset.
        assert_eq!(record.films, None);
    }

    #[test]
    fn missing_success_marker_means_not_found() {
        let payload = json!({
            "message": "not found",
            "result": null,
        });

        assert!(parse_person_payload(17, &payload).is_none());
    }

    #[test]
    fn missing_properties_means_not_found() {
        let payload = json!({
            "message": "ok",
            "result": {},
        });

        assert!(parse_person_payload(17, &payload).is_none());
    }

    #[test]
    fn malformed_properties_means_not_found() {
        // `height` is scripted with the wrong type.
        let payload = json!({
            "message": "ok",
            "result": {
                "properties": {
                    "name": "Luke Skywalker",
                    "height": 172,
                }
            }
        });

        assert!(parse_person_payload(17, &payload).is_none());
    }

    #[test]
    fn non_object_payload_means_not_found() {
        let payload = json!("Not Found");

        assert!(parse_person_payload(17, &payload).is_none());
    }
}
