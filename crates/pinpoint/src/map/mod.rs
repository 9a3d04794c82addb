//! Keeps a map widget and its draggable marker in step with the shared
//! coordinate.
//!
//! The widget itself belongs to the host UI and is reached through
//! [`MapViewport`] and [`DraggableMarker`]. [`MapSync`] watches the
//! [`CoordinateState`]: every change moves the marker and recenters the map at
//! its current zoom. Drag-end events from the marker are written back into the
//! state. A drag therefore ends in a recenter on the point the marker already
//! sits on, and the loop stops there because equal writes notify nobody.

use std::sync::{Arc, Mutex, Weak};

use tokio::sync::watch;
use tracing::{debug, instrument, trace};

use crate::{CoordinateState, Subscription, lock};
use pinpoint_geocode::Coordinate;

mod tiles;

pub use tiles::{MAX_ZOOM, OSM_TILE_TEMPLATE, TileIndex, TileSource, Viewport};

/// Map widget surface.
pub trait MapViewport: Send + Sync {
    fn zoom(&self) -> u8;
    fn set_view(&self, center: Coordinate, zoom: u8);
}

/// Callback invoked with the marker's position when a drag ends.
pub type DragEndListener = Box<dyn Fn(Coordinate) + Send + Sync>;

/// Registration handle returned by [`DraggableMarker::on_drag_end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Draggable marker surface.
pub trait DraggableMarker: Send + Sync {
    fn position(&self) -> Coordinate;
    fn set_position(&self, position: Coordinate);
    fn on_drag_end(&self, listener: DragEndListener) -> ListenerId;
    fn off_drag_end(&self, id: ListenerId);
}

struct AttachedMarker {
    marker: Arc<dyn DraggableMarker>,
    // Detaches the drag-end listener when the marker is replaced or dropped.
    _drag_end: Subscription,
}

#[derive(Default)]
struct Surfaces {
    map: Option<Arc<dyn MapViewport>>,
    marker: Option<AttachedMarker>,
}

impl Surfaces {
    /// Bring whatever surfaces are mounted to `coordinate`. Missing surfaces
    /// are skipped.
    fn apply(&self, coordinate: Coordinate) {
        if let Some(attached) = &self.marker
            && attached.marker.position() != coordinate
        {
            attached.marker.set_position(coordinate);
        }
        match &self.map {
            Some(map) => {
                let zoom = map.zoom();
                trace!(%coordinate, zoom, "Recentering map");
                map.set_view(coordinate, zoom);
            }
            None => debug!("No map mounted, skipping recenter"),
        }
    }
}

/// Two-way binding between a [`CoordinateState`] and the map surfaces.
///
/// Dropping the `MapSync` stops the state watcher and detaches the marker's
/// drag-end listener.
pub struct MapSync {
    state: CoordinateState,
    surfaces: Arc<Mutex<Surfaces>>,
    _watcher: Subscription,
}

impl MapSync {
    /// Start following `state`. Must be called from within a tokio runtime.
    pub fn new(state: CoordinateState) -> Self {
        let surfaces = Arc::new(Mutex::new(Surfaces::default()));
        let watcher = tokio::spawn(follow(state.subscribe(), Arc::downgrade(&surfaces)));
        Self {
            state,
            surfaces,
            _watcher: Subscription::from_task(watcher),
        }
    }

    /// Mount the map and center it on the current coordinate.
    pub fn attach_map(&self, map: Arc<dyn MapViewport>) {
        let mut surfaces = lock(&self.surfaces);
        surfaces.map = Some(map);
        surfaces.apply(self.state.get());
    }

    pub fn detach_map(&self) {
        lock(&self.surfaces).map = None;
    }

    /// Mount `marker`, replacing (and detaching) any previous one, and move it
    /// to the current coordinate.
    #[instrument(name = "Attach marker", skip_all, level = "debug")]
    pub fn attach_marker(&self, marker: Arc<dyn DraggableMarker>) {
        let state = self.state.clone();
        let id = marker.on_drag_end(Box::new(move |position| {
            debug!(%position, "Marker drag ended");
            state.set(position);
        }));
        let weak = Arc::downgrade(&marker);
        let drag_end = Subscription::new(move || {
            if let Some(marker) = weak.upgrade() {
                marker.off_drag_end(id);
            }
        });

        let previous = {
            let mut surfaces = lock(&self.surfaces);
            let previous = surfaces.marker.replace(AttachedMarker {
                marker,
                _drag_end: drag_end,
            });
            surfaces.apply(self.state.get());
            previous
        };
        // The old registration is released outside the lock.
        drop(previous);
    }

    pub fn detach_marker(&self) {
        // Released outside the lock.
        let previous = lock(&self.surfaces).marker.take();
        drop(previous);
    }

    /// Push the current coordinate to the mounted surfaces right away.
    pub fn sync(&self) {
        lock(&self.surfaces).apply(self.state.get());
    }

    /// Current center and zoom, once a map is mounted.
    pub fn viewport(&self) -> Option<Viewport> {
        let surfaces = lock(&self.surfaces);
        let map = surfaces.map.as_ref()?;
        Some(Viewport::new(self.state.get(), map.zoom()))
    }

    pub fn has_map(&self) -> bool {
        lock(&self.surfaces).map.is_some()
    }

    pub fn has_marker(&self) -> bool {
        lock(&self.surfaces).marker.is_some()
    }
}

impl std::fmt::Debug for MapSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSync")
            .field("coordinate", &self.state.get())
            .field("has_map", &self.has_map())
            .field("has_marker", &self.has_marker())
            .finish_non_exhaustive()
    }
}

async fn follow(mut changes: watch::Receiver<Coordinate>, surfaces: Weak<Mutex<Surfaces>>) {
    while changes.changed().await.is_ok() {
        let coordinate = *changes.borrow_and_update();
        let Some(surfaces) = surfaces.upgrade() else {
            break;
        };
        lock(&surfaces).apply(coordinate);
    }
}
