//! Pinpoint - location picking for multi-step report submission
//!
//! Pinpoint is the logic behind a "where did this happen?" step: a debounced
//! free-text place search against a geocoding service, a map whose viewport and
//! draggable marker follow one shared coordinate, and a step controller that
//! moves the report flow on once the user confirms.
//!
//! The rendering side (map widget, icons, styling, click-outside detection) is
//! left to the host UI. It drives pinpoint through a handful of handles and
//! plugs its widgets in through the [`MapViewport`] and [`DraggableMarker`]
//! traits.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pinpoint::{LocationPicker, PickerConfigBuilder};
//!
//! # async fn run() -> Result<(), pinpoint::error::PinpointError> {
//! let picker = LocationPicker::new(PickerConfigBuilder::from_env().build()?)?;
//!
//! // The search box
//! let search = picker.open_search();
//! search.on_input_change("Paris");
//! tokio::time::sleep(std::time::Duration::from_secs(2)).await;
//! if let Some(first) = search.results().first() {
//!     search.select_result(first);
//! }
//!
//! // The user is happy with the pin
//! println!("Confirmed {} at step {}", picker.coordinate(), picker.confirm());
//! # Ok(())
//! # }
//! ```
//!
//! # Ordering
//!
//! Keystrokes are debounced, and every scheduled lookup carries a sequence
//! ticket. Results are applied in the order lookups were scheduled, never in
//! the order responses happen to arrive, so a slow early response can not
//! overwrite a newer one.
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
pub mod error;
mod map;
mod search;
mod state;
mod step;
mod subscription;

pub use crate::core::LocationPicker;

pub use config::{GEOCODE_URL_ENV, PickerConfig, PickerConfigBuilder};
pub use map::{
    DragEndListener, DraggableMarker, ListenerId, MapSync, MapViewport, TileIndex, TileSource,
    Viewport,
};
pub use pinpoint_geocode as geocode;
pub use pinpoint_geocode::{Coordinate, GeocodeSettings, Geocoder, NominatimClient, SearchResult};
pub use search::{MAX_SEARCH_RESULTS, QueryScheduler, QueryTicket, SearchSession, SearchView};
pub use state::CoordinateState;
pub use step::{FormStep, StepController};
pub use subscription::Subscription;

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for pinpoint.
///
/// `RUST_LOG` wins when set; otherwise `level` is used. HTTP client internals
/// are held at `warn`. Safe to call more than once.
///
/// # Examples
///
/// ```rust
/// use pinpoint::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), pinpoint::error::PinpointError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::PinpointError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse()?)
            .add_directive("reqwest=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(())
    })
}

/// Lock a mutex, carrying on with the inner value if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
