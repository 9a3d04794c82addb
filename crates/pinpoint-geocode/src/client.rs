use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{Coordinate, GeocodeError, Geocoder, Result, SearchResult};

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Connection settings for a [`NominatimClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeSettings {
    /// Search endpoint; `q` and `format` are appended per request.
    pub endpoint: String,
    /// Upper bound for a single request, connect included.
    pub timeout: Duration,
    /// Nominatim's usage policy requires an identifying user agent.
    pub user_agent: String,
}

impl Default for GeocodeSettings {
    fn default() -> Self {
        Self {
            endpoint: NOMINATIM_SEARCH_URL.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Raw record as served by `/search?format=json`. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

impl TryFrom<NominatimPlace> for SearchResult {
    type Error = GeocodeError;

    fn try_from(place: NominatimPlace) -> Result<Self> {
        // `f64::from_str` also takes "NaN" and "inf", which are not places.
        let parse = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|parsed| parsed.is_finite())
                .ok_or_else(|| GeocodeError::InvalidCoordinate {
                    label: place.display_name.clone(),
                    value: value.to_string(),
                })
        };
        let coordinate = Coordinate::new(parse(&place.lat)?, parse(&place.lon)?);
        Ok(Self {
            label: place.display_name,
            coordinate,
        })
    }
}

/// Decode a Nominatim JSON body, keeping the provider's order.
///
/// A record with an unparsable or non-finite latitude or longitude makes the
/// whole body malformed.
pub fn parse_response(body: &str) -> Result<Vec<SearchResult>> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body)?;
    places.into_iter().map(SearchResult::try_from).collect()
}

/// [`Geocoder`] backed by a Nominatim-compatible HTTP service.
///
/// Every call is a single best-effort attempt; nothing is retried or cached.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    endpoint: Url,
}

impl NominatimClient {
    pub fn new(settings: &GeocodeSettings) -> Result<Self> {
        let endpoint = Url::parse(&settings.endpoint)?;
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// Full request URL for `text`, with the query form-encoded.
    pub fn request_url(&self, text: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", text)
            .append_pair("format", "json");
        url
    }

    async fn try_search(&self, text: &str) -> Result<Vec<SearchResult>> {
        let response = self.client.get(self.request_url(text)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status));
        }
        let body = response.text().await?;
        parse_response(&body)
    }
}

#[async_trait::async_trait]
impl Geocoder for NominatimClient {
    #[instrument(name = "Geocode search", skip(self), level = "debug")]
    async fn search(&self, text: &str) -> Vec<SearchResult> {
        match self.try_search(text).await {
            Ok(results) => {
                debug!(count = results.len(), "Geocode search complete");
                results
            }
            Err(error) => {
                warn!(query = text, %error, "Geocode search failed, returning no results");
                Vec::new()
            }
        }
    }
}
