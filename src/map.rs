//! HTML rendering of the alert map. Leaflet and OpenStreetMap tiles do the drawing;
//! this module only embeds the polygons.

use crate::cap::Polygon;

pub const MAP_CENTER: [f64; 2] = [55.6761, 12.5683];
pub const INITIAL_ZOOM: u8 = 3;
pub const MAX_ZOOM: u8 = 20;

const LEAFLET_VERSION: &str = "1.9.4";
const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

const MAP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>CAP alerts</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@__LEAFLET__/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@__LEAFLET__/dist/leaflet.js"></script>
<style>html, body { margin: 0; } #map { height: 100vh; width: 100vw; }</style>
</head>
<body>
<div id="map"></div>
<script>
const polygons = __POLYGONS__;
const map = L.map("map", { center: __CENTER__, zoom: __ZOOM__, maxZoom: __MAX_ZOOM__ });
L.tileLayer(__TILE_URL__, { attribution: __ATTRIBUTION__ }).addTo(map);
for (const positions of polygons) {
  L.polygon(positions).addTo(map);
}
</script>
</body>
</html>
"#;

const NO_ALERTS_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>CAP alerts</title></head>
<body><div>No alerts found.</div></body>
</html>
"#;

/// Serializes a value for inclusion inside a `<script>` element.
fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

/// The full map page with every polygon drawn.
pub fn render_map_page(polygons: &[Polygon]) -> String {
    MAP_TEMPLATE
        .replace("__LEAFLET__", LEAFLET_VERSION)
        .replace("__CENTER__", &script_json(&MAP_CENTER))
        .replace("__MAX_ZOOM__", &MAX_ZOOM.to_string())
        .replace("__ZOOM__", &INITIAL_ZOOM.to_string())
        .replace("__TILE_URL__", &script_json(TILE_URL))
        .replace("__ATTRIBUTION__", &script_json(TILE_ATTRIBUTION))
        .replace("__POLYGONS__", &script_json(polygons))
}

pub fn render_no_alerts_page() -> String {
    NO_ALERTS_PAGE.to_string()
}
