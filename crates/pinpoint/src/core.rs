//! The [`LocationPicker`] ties the pieces of the location step together.
//!
//! One picker per report flow. It owns the shared coordinate and the step
//! controller, and hands out the per-mount pieces: a [`SearchSession`] for the
//! search box and a [`MapSync`] for the map. These are the two points where
//! the host UI observes or drives the flow:
//!
//! - [`coordinate`](LocationPicker::coordinate) /
//!   [`set_coordinate`](LocationPicker::set_coordinate)
//! - [`current_step`](LocationPicker::current_step) /
//!   [`confirm`](LocationPicker::confirm)
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pinpoint::{Coordinate, Geocoder, LocationPicker, PickerConfig, SearchResult};
//!
//! struct NoResults;
//!
//! #[async_trait::async_trait]
//! impl Geocoder for NoResults {
//!     async fn search(&self, _text: &str) -> Vec<SearchResult> {
//!         Vec::new()
//!     }
//! }
//!
//! let picker = LocationPicker::with_geocoder(PickerConfig::default(), Arc::new(NoResults));
//! picker.set_coordinate(Coordinate::new(48.86, 2.35));
//! assert_eq!(picker.confirm().index(), 3);
//! ```

use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    CoordinateState, FormStep, MapSync, PickerConfig, SearchSession, StepController, TileSource,
    Viewport, error::PinpointError,
};
use pinpoint_geocode::{Coordinate, Geocoder, NominatimClient};

pub struct LocationPicker {
    config: PickerConfig,
    coordinate: CoordinateState,
    steps: StepController,
    geocoder: Arc<dyn Geocoder>,
    tiles: TileSource,
}

impl LocationPicker {
    /// Build a picker that geocodes through Nominatim as configured.
    #[instrument(name = "Create LocationPicker", skip_all, level = "info")]
    pub fn new(config: PickerConfig) -> Result<Self, PinpointError> {
        let geocoder = NominatimClient::new(&config.geocode)?;
        info!(endpoint = %config.geocode.endpoint, "Geocoder ready");
        Ok(Self::with_geocoder(config, Arc::new(geocoder)))
    }

    /// Build a picker around any [`Geocoder`].
    pub fn with_geocoder(config: PickerConfig, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            coordinate: CoordinateState::new(config.initial_coordinate),
            steps: StepController::new(config.confirm_step),
            tiles: TileSource::new(config.tile_template.clone()),
            geocoder,
            config,
        }
    }

    /// Mount a search box. Dropping the session unmounts it.
    pub fn open_search(&self) -> SearchSession {
        SearchSession::new(
            Arc::clone(&self.geocoder),
            self.coordinate.clone(),
            self.config.debounce,
            self.config.max_results,
        )
    }

    /// Start keeping a map in step with the coordinate. Must be called from
    /// within a tokio runtime.
    pub fn mount_map(&self) -> MapSync {
        MapSync::new(self.coordinate.clone())
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate.get()
    }

    pub fn set_coordinate(&self, coordinate: Coordinate) {
        self.coordinate.set(coordinate);
    }

    /// Shared handle for anything that needs to watch the coordinate.
    pub fn coordinate_state(&self) -> &CoordinateState {
        &self.coordinate
    }

    pub fn current_step(&self) -> FormStep {
        self.steps.current()
    }

    /// Confirm the location and move the flow on. Always succeeds, whether or
    /// not a location was actually picked.
    pub fn confirm(&self) -> FormStep {
        info!(coordinate = %self.coordinate.get(), "Confirming location");
        self.steps.confirm()
    }

    pub fn steps(&self) -> &StepController {
        &self.steps
    }

    /// Where the map widget should open.
    pub fn initial_viewport(&self) -> Viewport {
        Viewport::new(self.coordinate.get(), self.config.initial_zoom)
    }

    pub fn tile_source(&self) -> &TileSource {
        &self.tiles
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }
}

impl std::fmt::Debug for LocationPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationPicker")
            .field("coordinate", &self.coordinate.get())
            .field("step", &self.steps.current())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
