//! Places of interest
//!
//! The catalog is loaded once per session and never mutated.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tourguide_geo::LatLng;

/// Unique identifier for a place
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(String);

impl PlaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlaceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub position: LatLng,
    pub title: String,
    pub description: String,
}

impl Place {
    pub fn new(
        id: impl Into<String>,
        position: LatLng,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: PlaceId::new(id),
            position,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Text read aloud when the place is selected
    pub fn readout(&self) -> String {
        format!("{}. {}", self.title, self.description)
    }
}

/// Catalog error
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Duplicate place id: {0}")]
    DuplicateId(PlaceId),

    #[error("Place with empty id: {title:?}")]
    EmptyId { title: String },

    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered, immutable set of places
#[derive(Debug, Clone, Default)]
pub struct PlaceCatalog {
    places: Vec<Place>,
}

impl PlaceCatalog {
    pub fn new(places: Vec<Place>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(places.len());
        for place in &places {
            if place.id.as_str().is_empty() {
                return Err(CatalogError::EmptyId { title: place.title.clone() });
            }
            if !seen.insert(&place.id) {
                return Err(CatalogError::DuplicateId(place.id.clone()));
            }
        }
        Ok(Self { places })
    }

    /// Parse a JSON array of places
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let places: Vec<Place> = serde_json::from_str(json)?;
        Self::new(places)
    }

    /// Load a JSON catalog file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Demo catalog: historic center of Rionegro, Antioquia
    pub fn builtin() -> Self {
        Self {
            places: vec![
                Place::new(
                    "1",
                    LatLng::new(6.1550, -75.3739),
                    "Parque Principal de Rionegro",
                    "El corazón de la ciudad, rodeado de historia y comercio.",
                ),
                Place::new(
                    "2",
                    LatLng::new(6.1545, -75.3742),
                    "Museo de Arte Religioso",
                    "Conserva una importante colección de arte religioso de la región.",
                ),
                Place::new(
                    "3",
                    LatLng::new(6.1555, -75.3735),
                    "Catedral San Nicolás el Magno",
                    "Imponente catedral de estilo neoclásico.",
                ),
                Place::new(
                    "4",
                    LatLng::new(6.1520, -75.3750),
                    "Puente Mejía",
                    "Histórico puente de calicanto sobre el río Negro.",
                ),
                Place::new(
                    "5",
                    LatLng::new(6.1333, -75.4000),
                    "Tutucán",
                    "Réplica de un pueblo tradicional antioqueño.",
                ),
            ],
        }
    }

    /// Get place by id
    pub fn get(&self, id: &PlaceId) -> Option<&Place> {
        self.places.iter().find(|p| &p.id == id)
    }

    /// Check if the catalog has a place
    pub fn contains(&self, id: &PlaceId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate places in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Place> {
        self.places.iter()
    }

    /// Get number of places
    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}
