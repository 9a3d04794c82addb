//! The single "currently selected coordinate" shared by search, map and form.
//!
//! Writers are search selection and marker drag; readers are the map viewport,
//! the marker and whatever submits the report. Every write replaces the whole
//! value, so a reader sees either the old point or the new one, never a mix.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use pinpoint_geocode::Coordinate;

/// Cloneable handle onto one shared coordinate.
///
/// Clones observe and write the same value. Last write wins and no history is
/// kept.
#[derive(Debug, Clone)]
pub struct CoordinateState {
    tx: Arc<watch::Sender<Coordinate>>,
}

impl CoordinateState {
    pub fn new(initial: Coordinate) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> Coordinate {
        *self.tx.borrow()
    }

    /// Replace the coordinate. Returns `false`, and wakes nobody, when the new
    /// value equals the current one.
    pub fn set(&self, coordinate: Coordinate) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == coordinate {
                false
            } else {
                *current = coordinate;
                true
            }
        });
        if changed {
            debug!(%coordinate, "Coordinate updated");
        }
        changed
    }

    /// Receiver that is notified after every effective [`set`](Self::set).
    /// The value at subscription time counts as already seen.
    pub fn subscribe(&self) -> watch::Receiver<Coordinate> {
        self.tx.subscribe()
    }
}

impl Default for CoordinateState {
    fn default() -> Self {
        Self::new(Coordinate::default())
    }
}
