//! Core data types for the ingest pipeline.

/// Identifier of a person record, assigned from the configured source range.
pub type PersonId = i32;

/// Flattened in-memory representation of one person fetched from the remote API.
///
/// The identifier comes from the source range, not from the remote service. Every other
/// attribute is an optional free-form string as returned by the API, except `vehicles`
/// which is a sequence of strings. A record is built once per successful fetch, flows
/// through the rebatching stage, and is dropped after its batch is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroRecord {
    pub id: PersonId,
    pub birth_year: Option<String>,
    pub eye_color: Option<String>,
    pub films: Option<String>,
    pub gender: Option<String>,
    pub hair_color: Option<String>,
    pub height: Option<String>,
    pub homeworld: Option<String>,
    pub mass: Option<String>,
    pub name: Option<String>,
    pub skin_color: Option<String>,
    pub species: Option<String>,
    pub starships: Option<String>,
    pub vehicles: Option<Vec<String>>,
}

impl HeroRecord {
    /// Creates a record that carries only the identifier, with every attribute unset.
    pub fn empty(id: PersonId) -> Self {
        Self {
            id,
            birth_year: None,
            eye_color: None,
            films: None,
            gender: None,
            hair_color: None,
            height: None,
            homeworld: None,
            mass: None,
            name: None,
            skin_color: None,
            species: None,
            starships: None,
            vehicles: None,
        }
    }
}
