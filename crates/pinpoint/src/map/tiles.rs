use std::f64::consts::PI;

use itertools::Itertools;

use pinpoint_geocode::Coordinate;

pub const OSM_TILE_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Highest zoom level served by the standard OpenStreetMap tile layer.
pub const MAX_ZOOM: u8 = 19;

/// Web Mercator cuts off at this latitude.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// What the map widget should show: a center and a zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

impl Viewport {
    pub const fn new(center: Coordinate, zoom: u8) -> Self {
        Self { center, zoom }
    }

    /// Slippy-map tile containing the center.
    pub fn center_tile(&self) -> TileIndex {
        TileIndex::containing(self.center, self.zoom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileIndex {
    pub fn containing(coordinate: Coordinate, zoom: u8) -> Self {
        let zoom = zoom.min(MAX_ZOOM);
        let n = f64::from(1_u32 << zoom);
        let last = (1_u32 << zoom) - 1;

        let lat = coordinate
            .lat
            .clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT)
            .to_radians();
        let x = ((coordinate.lng + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();

        Self {
            z: zoom,
            x: (x.max(0.0) as u32).min(last),
            y: (y.max(0.0) as u32).min(last),
        }
    }
}

/// Templated tile URL handed to the map widget. Tiles are never fetched here.
///
/// Recognised placeholders: `{s}` (subdomain), `{z}`, `{x}`, `{y}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSource {
    template: String,
    subdomains: Vec<String>,
}

impl TileSource {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            subdomains: ["a", "b", "c"].map(String::from).to_vec(),
        }
    }

    pub fn openstreetmap() -> Self {
        Self::new(OSM_TILE_TEMPLATE)
    }

    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains.into_iter().map(Into::into).collect_vec();
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Expand the template for one tile. The subdomain rotates on `x + y` so
    /// neighbouring tiles spread across hosts.
    pub fn url(&self, tile: TileIndex) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            let slot = (u64::from(tile.x) + u64::from(tile.y)) % self.subdomains.len() as u64;
            &self.subdomains[slot as usize]
        };
        self.template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

impl Default for TileSource {
    fn default() -> Self {
        Self::openstreetmap()
    }
}
