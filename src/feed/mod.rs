//! CAP feed processing module.
//!
//! This module handles fetching the RSS index and the alerts it links to, and
//! turning them into polygons for the map.

mod check;
mod client;
mod fetcher;
mod parser;
mod types;
mod util;

pub use self::types::*;

pub use self::check::check_feed;
pub use self::client::{create_http_client, fetch_text};
pub use self::fetcher::collect_polygons;
pub use self::parser::{load_alert, load_index, parse_xml};
pub use self::util::{cleanup_xml, decode_body};
