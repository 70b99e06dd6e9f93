//! Polygon extraction from validated alerts.
//!
//! CAP encodes a ring as whitespace separated `lat,lng` pairs. A ring with any
//! malformed pair is dropped on its own; the rest of the alert is unaffected.

use serde::Serialize;
use tracing::debug;

use super::alert::Alert;
use crate::TARGET_VALIDATION;

/// A `[latitude, longitude]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng(pub f64, pub f64);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Polygon(pub Vec<LatLng>);

impl Polygon {
    pub fn points(&self) -> &[LatLng] {
        &self.0
    }
}

/// Parses one CAP polygon string. Returns `None` for empty input or any bad pair.
pub fn parse_polygon(text: &str) -> Option<Polygon> {
    let points = text
        .split_whitespace()
        .map(parse_point)
        .collect::<Option<Vec<_>>>()?;
    if points.is_empty() {
        return None;
    }
    Some(Polygon(points))
}

fn parse_point(token: &str) -> Option<LatLng> {
    let mut parts = token.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(lat), Some(lng), None) => Some(LatLng(coordinate(lat)?, coordinate(lng)?)),
        _ => None,
    }
}

fn coordinate(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Every polygon of every area of every info block, flattened. Circles and
/// named areas contribute nothing.
pub fn extract_polygons(alert: &Alert) -> Vec<Polygon> {
    alert
        .info
        .iter()
        .flat_map(|info| &info.areas)
        .flat_map(|area| &area.polygons)
        .filter_map(|text| {
            let polygon = parse_polygon(text);
            if polygon.is_none() && !text.trim().is_empty() {
                debug!(target: TARGET_VALIDATION, "Dropping malformed polygon in alert {}: {}", alert.identifier, text);
            }
            polygon
        })
        .collect()
}
