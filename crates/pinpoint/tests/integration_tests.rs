//! Integration tests for the pinpoint location step
//!
//! These drive the public API the way a host UI would: type into the search
//! box, pick a result, drag the marker, confirm. The geocoder and map widgets
//! are in-memory doubles and time is paused, so nothing touches the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pinpoint::{
    Coordinate, DragEndListener, DraggableMarker, FormStep, Geocoder, ListenerId, LocationPicker,
    MAX_SEARCH_RESULTS, MapViewport, PickerConfig, PickerConfigBuilder, SearchResult,
    error::PinpointError,
};

fn setup_test_env() {
    let _ = pinpoint::init_logging(tracing::Level::WARN);
}

/// Answers "Paris" with seven places after a short delay and records every call.
#[derive(Default)]
struct ParisGeocoder {
    calls: Mutex<Vec<String>>,
}

impl ParisGeocoder {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Geocoder for ParisGeocoder {
    async fn search(&self, text: &str) -> Vec<SearchResult> {
        self.calls.lock().unwrap().push(text.to_string());
        tokio::time::sleep(Duration::from_millis(80)).await;
        if text != "Paris" {
            return Vec::new();
        }
        (0..7)
            .map(|i| {
                SearchResult::new(
                    format!("Paris result {i}"),
                    Coordinate::new(48.85 + f64::from(i) * 0.01, 2.35),
                )
            })
            .collect()
    }
}

struct LeafletLikeMap {
    zoom: u8,
    views: Mutex<Vec<(Coordinate, u8)>>,
}

impl MapViewport for LeafletLikeMap {
    fn zoom(&self) -> u8 {
        self.zoom
    }

    fn set_view(&self, center: Coordinate, zoom: u8) {
        self.views.lock().unwrap().push((center, zoom));
    }
}

#[derive(Default)]
struct LeafletLikeMarker {
    position: Mutex<Coordinate>,
    next_id: AtomicU64,
    listeners: Mutex<HashMap<ListenerId, Arc<dyn Fn(Coordinate) + Send + Sync>>>,
}

impl LeafletLikeMarker {
    fn drag_to(&self, to: Coordinate) {
        *self.position.lock().unwrap() = to;
        let listeners: Vec<_> = self.listeners.lock().unwrap().values().cloned().collect();
        for listener in listeners {
            listener(to);
        }
    }
}

impl DraggableMarker for LeafletLikeMarker {
    fn position(&self) -> Coordinate {
        *self.position.lock().unwrap()
    }

    fn set_position(&self, position: Coordinate) {
        *self.position.lock().unwrap() = position;
    }

    fn on_drag_end(&self, listener: DragEndListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners.lock().unwrap().insert(id, Arc::from(listener));
        id
    }

    fn off_drag_end(&self, id: ListenerId) {
        self.listeners.lock().unwrap().remove(&id);
    }
}

fn picker_with(geocoder: Arc<ParisGeocoder>) -> LocationPicker {
    let config = PickerConfigBuilder::new()
        .initial_coordinate(Coordinate::new(51.5074, -0.1278))
        .build()
        .expect("Default config should validate");
    LocationPicker::with_geocoder(config, geocoder)
}

#[tokio::test(start_paused = true)]
async fn test_full_location_step() {
    setup_test_env();

    let geocoder = Arc::new(ParisGeocoder::default());
    let picker = picker_with(geocoder.clone());
    let search = picker.open_search();
    let map_sync = picker.mount_map();
    let map = Arc::new(LeafletLikeMap {
        zoom: 13,
        views: Mutex::new(Vec::new()),
    });
    let marker = Arc::new(LeafletLikeMarker::default());
    map_sync.attach_map(map.clone());
    map_sync.attach_marker(marker.clone());

    // 1. Typing "Paris" quickly results in one lookup
    for text in ["Pa", "Par", "Pari", "Paris"] {
        search.on_input_change(text);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(geocoder.calls(), vec!["Paris".to_string()]);

    // 2. Seven places come back, five are shown
    let view = search.view();
    assert_eq!(view.results.len(), 5);
    assert!(view.is_open);
    assert_eq!(view.results[4].label, "Paris result 4");

    // 3. Picking the third moves the coordinate, marker and map
    let third = search.select_index(2).expect("Third result should exist");
    assert_eq!(search.query_text(), third.label);
    assert!(!search.is_open());
    assert_eq!(picker.coordinate(), third.coordinate);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(marker.position(), third.coordinate);
    assert_eq!(
        map.views.lock().unwrap().last(),
        Some(&(third.coordinate, 13))
    );

    // 4. Dragging fine-tunes it
    marker.drag_to(Coordinate::new(48.86, 2.35));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(picker.coordinate(), Coordinate::new(48.86, 2.35));
    assert_eq!(
        map.views.lock().unwrap().last(),
        Some(&(Coordinate::new(48.86, 2.35), 13))
    );

    // 5. Confirm moves the flow on
    assert_eq!(picker.confirm(), FormStep::AFTER_LOCATION);
    assert_eq!(picker.current_step().index(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_confirm_with_untouched_coordinate() {
    setup_test_env();

    let picker = picker_with(Arc::new(ParisGeocoder::default()));
    assert_eq!(picker.coordinate(), Coordinate::new(51.5074, -0.1278));

    picker.confirm();

    assert_eq!(picker.current_step(), FormStep::AFTER_LOCATION);
    assert_eq!(picker.coordinate(), Coordinate::new(51.5074, -0.1278));
}

#[tokio::test(start_paused = true)]
async fn test_search_results_never_exceed_five() {
    setup_test_env();

    let config = PickerConfigBuilder::new().max_results(5).build().unwrap();
    let picker = LocationPicker::with_geocoder(config, Arc::new(ParisGeocoder::default()));
    let search = picker.open_search();

    search.on_input_change("Paris");
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(search.results().len() <= 5);
}

#[tokio::test(start_paused = true)]
async fn test_result_cap_cannot_be_raised() {
    setup_test_env();

    // Step 1: the builder refuses a larger panel
    let result = PickerConfigBuilder::new().max_results(8).build();
    assert!(matches!(result, Err(PinpointError::ConfigError(_))));

    // Step 2: a hand-built config is clamped when the search box mounts
    let config = PickerConfig {
        max_results: 8,
        ..PickerConfig::default()
    };
    let picker = LocationPicker::with_geocoder(config, Arc::new(ParisGeocoder::default()));
    let search = picker.open_search();

    search.on_input_change("Paris");
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(search.results().len(), MAX_SEARCH_RESULTS);
    assert_eq!(search.results()[0].label, "Paris result 0");
}

#[tokio::test(start_paused = true)]
async fn test_unmounting_map_releases_marker() {
    setup_test_env();

    let picker = picker_with(Arc::new(ParisGeocoder::default()));
    let marker = Arc::new(LeafletLikeMarker::default());

    let map_sync = picker.mount_map();
    map_sync.attach_marker(marker.clone());
    assert_eq!(marker.listeners.lock().unwrap().len(), 1);
    drop(map_sync);
    assert!(marker.listeners.lock().unwrap().is_empty());

    // Drags after unmount go nowhere
    marker.drag_to(Coordinate::new(0.5, 0.5));
    assert_eq!(picker.coordinate(), Coordinate::new(51.5074, -0.1278));
}

#[tokio::test(start_paused = true)]
async fn test_empty_input_after_results() {
    setup_test_env();

    let geocoder = Arc::new(ParisGeocoder::default());
    let picker = picker_with(geocoder.clone());
    let search = picker.open_search();

    search.on_input_change("Paris");
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(search.is_open());

    search.on_input_change("");
    assert!(search.results().is_empty());
    assert!(!search.is_open());
    assert!(!search.has_pending_query());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(geocoder.calls().len(), 1);
}
