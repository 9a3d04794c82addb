//! Live search against Nominatim, then confirm the first hit
//!
//! Run with a place name, e.g. `cargo run --example search_and_confirm -- "Eiffel Tower"`.
//! Set `PINPOINT_GEOCODE_URL` to point at a self-hosted Nominatim instead.

use std::time::Duration;

use pinpoint::{LocationPicker, PickerConfigBuilder, init_logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(tracing::Level::INFO)?;

    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Paris".to_string());
    let config = PickerConfigBuilder::from_env()
        .user_agent("pinpoint-example/0.1")
        .build()?;
    let debounce = config.debounce;
    let picker = LocationPicker::new(config)?;
    let search = picker.open_search();

    search.on_input_change(query.as_str());
    // Debounce plus a generous allowance for the request
    tokio::time::sleep(debounce + Duration::from_secs(5)).await;

    let results = search.results();
    if results.is_empty() {
        println!("No places found for '{query}'");
        return Ok(());
    }
    for (i, result) in results.iter().enumerate() {
        println!("  {}. {} {}", i + 1, result.label, result.coordinate);
    }

    search.select_index(0);
    let viewport = picker.initial_viewport();
    println!(
        "\nSelected {} (tile {})",
        picker.coordinate(),
        picker.tile_source().url(viewport.center_tile())
    );
    println!("Flow moved to step {}", picker.confirm());
    Ok(())
}
