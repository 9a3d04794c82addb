use std::time::Duration;

use pinpoint_geocode::{Coordinate, GeocodeSettings};

use crate::{
    FormStep, MAX_SEARCH_RESULTS, error::PinpointError, map::MAX_ZOOM, map::OSM_TILE_TEMPLATE,
};

/// Environment variable overriding the geocoding endpoint in
/// [`PickerConfigBuilder::from_env`].
pub const GEOCODE_URL_ENV: &str = "PINPOINT_GEOCODE_URL";

/// Everything a [`LocationPicker`](crate::LocationPicker) needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerConfig {
    /// Quiet period after the last keystroke before a lookup is sent.
    pub debounce: Duration,
    /// How many results the search panel shows, at most [`MAX_SEARCH_RESULTS`].
    pub max_results: usize,
    pub geocode: GeocodeSettings,
    /// Coordinate the flow starts from before anything is picked.
    pub initial_coordinate: Coordinate,
    pub initial_zoom: u8,
    pub tile_template: String,
    /// Step the flow jumps to when the location is confirmed.
    pub confirm_step: FormStep,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            max_results: MAX_SEARCH_RESULTS,
            geocode: GeocodeSettings::default(),
            initial_coordinate: Coordinate::default(),
            initial_zoom: 13,
            tile_template: OSM_TILE_TEMPLATE.to_string(),
            confirm_step: FormStep::AFTER_LOCATION,
        }
    }
}

impl PickerConfig {
    pub fn builder() -> PickerConfigBuilder {
        PickerConfigBuilder::new()
    }
}

/// Builder for [`PickerConfig`] with validation on [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct PickerConfigBuilder {
    config: PickerConfig,
}

impl PickerConfigBuilder {
    /// Create a new builder with sensible defaults
    pub fn new() -> Self {
        Self {
            config: PickerConfig::default(),
        }
    }

    /// Defaults, with the geocoding endpoint taken from `PINPOINT_GEOCODE_URL`
    /// when set.
    pub fn from_env() -> Self {
        let builder = Self::new();
        match std::env::var(GEOCODE_URL_ENV) {
            Ok(endpoint) if !endpoint.trim().is_empty() => builder.geocode_endpoint(endpoint),
            _ => builder,
        }
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.config.debounce = debounce;
        self
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.config.max_results = max_results;
        self
    }

    pub fn geocode_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.geocode.endpoint = endpoint.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.geocode.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.geocode.user_agent = user_agent.into();
        self
    }

    /// Start from a previously chosen point instead of the origin.
    pub fn initial_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.config.initial_coordinate = coordinate;
        self
    }

    pub fn initial_zoom(mut self, zoom: u8) -> Self {
        self.config.initial_zoom = zoom;
        self
    }

    pub fn tile_template(mut self, template: impl Into<String>) -> Self {
        self.config.tile_template = template.into();
        self
    }

    pub fn confirm_step(mut self, step: FormStep) -> Self {
        self.config.confirm_step = step;
        self
    }

    pub fn build(self) -> Result<PickerConfig, PinpointError> {
        let config = self.config;
        if !(1..=MAX_SEARCH_RESULTS).contains(&config.max_results) {
            return Err(PinpointError::ConfigError(format!(
                "max_results must be between 1 and {MAX_SEARCH_RESULTS}, got {}",
                config.max_results
            )));
        }
        if config.initial_zoom > MAX_ZOOM {
            return Err(PinpointError::ConfigError(format!(
                "initial_zoom must be at most {MAX_ZOOM}, got {}",
                config.initial_zoom
            )));
        }
        if !config.initial_coordinate.is_valid() {
            return Err(PinpointError::ConfigError(format!(
                "initial_coordinate {} is out of range",
                config.initial_coordinate
            )));
        }
        if config.geocode.timeout.is_zero() {
            return Err(PinpointError::ConfigError(
                "request timeout must be non-zero".to_string(),
            ));
        }
        Ok(config)
    }
}
