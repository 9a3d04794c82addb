//! Free-text place search for the pinpoint location picker.
//!
//! This crate holds the value types shared by the whole workspace ([`Coordinate`],
//! [`SearchResult`]), the [`Geocoder`] seam the search session talks to, and
//! [`NominatimClient`], the production implementation backed by an
//! OpenStreetMap Nominatim-compatible `/search` endpoint.
//!
//! A [`Geocoder`] never fails outward: network errors, timeouts and malformed
//! bodies all come back as an empty list, with the cause logged through `tracing`.
use std::fmt;

use serde::{Deserialize, Serialize};

mod client;
mod error;

pub use client::{GeocodeSettings, NOMINATIM_SEARCH_URL, NominatimClient, parse_response};
pub use error::{GeocodeError, Result};

/// A point on the globe in decimal degrees.
///
/// Treated as an immutable value: holders replace it wholesale instead of
/// mutating one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both axes fall inside `[-90, 90]` and `[-180, 180]`.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// One place returned by a geocoding lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Human readable name, exposed verbatim from the provider.
    pub label: String,
    pub coordinate: Coordinate,
}

impl SearchResult {
    pub fn new(label: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            label: label.into(),
            coordinate,
        }
    }
}

/// Anything that can turn free text into candidate places.
///
/// Implementations return the provider's full result list in provider order and
/// must swallow their own failures, returning an empty list instead.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, text: &str) -> Vec<SearchResult>;
}
