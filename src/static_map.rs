//! Map pins and static map URL construction.
//!
//! Clicks on the map viewport are converted to coordinates with the Web
//! Mercator projection; the static image itself is fetched by whoever opens
//! the generated URL.

use crate::constants;
use std::f64::consts::PI;

/// A named coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLocation {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
    /// Display name
    pub name: String,
}

impl MapLocation {
    /// Creates a location.
    pub fn new(lat: f64, lng: f64, name: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            name: name.into(),
        }
    }
}

impl Default for MapLocation {
    fn default() -> Self {
        Self::new(35.6586, 139.7454, "Tokyo Tower")
    }
}

/// Landmarks offered as one-click pins.
pub fn predefined_locations() -> Vec<MapLocation> {
    vec![
        MapLocation::new(35.6586, 139.7454, "Tokyo Tower"),
        MapLocation::new(35.7101, 139.8107, "Tokyo Skytree"),
        MapLocation::new(35.6896, 139.7006, "Shinjuku Station"),
        MapLocation::new(35.6812, 139.7671, "Tokyo Station"),
        MapLocation::new(35.6580, 139.7016, "Shibuya Station"),
    ]
}

/// Settings for static map requests.
///
/// Loaded from the environment; every value except the API key has a default.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticMapConfig {
    /// Provider API key (`GOOGLE_API_KEY`)
    pub api_key: Option<String>,
    /// Image size in pixels (`PEDIGREE_MAP_SIZE`, e.g. `1200x800`)
    pub size: (u32, u32),
    /// Pixel density multiplier (`PEDIGREE_MAP_SCALE`)
    pub scale: u8,
    /// Map style (`PEDIGREE_MAP_TYPE`)
    pub map_type: String,
    /// Endpoint (`PEDIGREE_MAP_URL`)
    pub base_url: String,
}

impl Default for StaticMapConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            size: (1200, 800),
            scale: 2,
            map_type: "roadmap".to_string(),
            base_url: "https://maps.googleapis.com/maps/api/staticmap".to_string(),
        }
    }
}

impl StaticMapConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let api_key = lookup("GOOGLE_API_KEY").filter(|k| !k.trim().is_empty());
        let size = lookup("PEDIGREE_MAP_SIZE")
            .and_then(|v| parse_size(&v))
            .unwrap_or(defaults.size);
        let scale = lookup("PEDIGREE_MAP_SCALE")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.scale);
        let map_type = lookup("PEDIGREE_MAP_TYPE").unwrap_or(defaults.map_type);
        let base_url = lookup("PEDIGREE_MAP_URL").unwrap_or(defaults.base_url);

        Self {
            api_key,
            size,
            scale,
            map_type,
            base_url,
        }
    }
}

fn parse_size(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.split_once('x')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

/// Builds the static map image URL centered on `location`.
///
/// Fails when no API key is configured.
pub fn static_map_url(
    config: &StaticMapConfig,
    location: &MapLocation,
    zoom: u8,
) -> Result<String, String> {
    let key = config
        .api_key
        .as_deref()
        .ok_or_else(|| "Google Maps API key is not configured (set GOOGLE_API_KEY)".to_string())?;
    Ok(format!(
        "{}?center={},{}&zoom={}&size={}x{}&scale={}&maptype={}&key={}",
        config.base_url,
        location.lat,
        location.lng,
        zoom,
        config.size.0,
        config.size.1,
        config.scale,
        config.map_type,
        key
    ))
}

/// Projects a coordinate to world pixels at the given zoom.
fn project(lat: f64, lng: f64, zoom: u8) -> (f64, f64) {
    let world = constants::MAP_TILE_SIZE * 2f64.powi(zoom as i32);
    let sin = lat.to_radians().sin().clamp(-0.9999, 0.9999);
    let x = (lng + 180.0) / 360.0 * world;
    let y = (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * world;
    (x, y)
}

fn unproject(x: f64, y: f64, zoom: u8) -> (f64, f64) {
    let world = constants::MAP_TILE_SIZE * 2f64.powi(zoom as i32);
    let lng = x / world * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / world;
    let lat = n.sinh().atan().to_degrees();
    (lat, lng)
}

/// Converts a pixel inside a viewport centered on `center` into a coordinate.
pub fn pixel_to_location(
    center: &MapLocation,
    zoom: u8,
    viewport: (f64, f64),
    pixel: (f64, f64),
) -> MapLocation {
    let (cx, cy) = project(center.lat, center.lng, zoom);
    let x = cx + pixel.0 - viewport.0 / 2.0;
    let y = cy + pixel.1 - viewport.1 / 2.0;
    let (lat, lng) = unproject(x, y, zoom);
    MapLocation::new(lat, lng, "Clicked location")
}

/// Where `location` falls inside a viewport centered on `center`.
pub fn location_to_pixel(
    center: &MapLocation,
    zoom: u8,
    viewport: (f64, f64),
    location: &MapLocation,
) -> (f64, f64) {
    let (cx, cy) = project(center.lat, center.lng, zoom);
    let (x, y) = project(location.lat, location.lng, zoom);
    (x - cx + viewport.0 / 2.0, y - cy + viewport.1 / 2.0)
}
