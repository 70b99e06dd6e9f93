//! Type definitions for the feed module.

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::cap::{Polygon, ValidationError};
use crate::xml::XmlError;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("non-success status {status} from {url}")]
    Status { url: String, status: StatusCode },
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Why a single document (the index or one alert) could not be used.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("not well-formed XML: {0}")]
    Xml(#[from] XmlError),
    #[error("failed validation: {0}")]
    Validation(#[from] ValidationError),
}

/// Counters for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchReport {
    pub items: usize,
    pub alerts_loaded: usize,
    pub alerts_failed: usize,
    pub alerts_without_polygons: usize,
    pub polygons: usize,
}

/// Everything the map needs from one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlertMap {
    pub polygons: Vec<Polygon>,
    pub report: FetchReport,
}

impl AlertMap {
    /// The index listed no alerts at all.
    pub fn no_alerts(&self) -> bool {
        self.report.items == 0
    }
}

/// Diagnostic status of one index item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ItemStatus {
    Ok,
    FetchFailed,
    InvalidXml,
    InvalidAlert,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemCheck {
    pub title: String,
    pub link: String,
    pub status: ItemStatus,
    pub info_blocks: usize,
    pub areas: usize,
    pub polygons: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedCheck {
    pub url: String,
    pub channel_title: String,
    pub items: Vec<ItemCheck>,
}

pub const USER_AGENT: &str = concat!("capmap/", env!("CARGO_PKG_VERSION"));
pub const ACCEPT_XML: &str =
    "application/rss+xml, application/cap+xml, application/xml, text/xml, */*;q=0.9";
