//! Fetch, parse and validate a single document.

use serde_json::Value;
use tracing::{debug, warn};

use super::client::fetch_text;
use super::types::DocumentError;
use super::util::cleanup_xml;
use crate::cap::{validate_alert_document, validate_index_document, Alert, Channel};
use crate::xml::{parse_document, XmlError};
use crate::TARGET_WEB_REQUEST;

/// Parses XML, retrying once on a cleaned-up copy. The first error is the one reported.
pub fn parse_xml(text: &str, url: &str) -> Result<Value, XmlError> {
    match parse_document(text) {
        Ok(document) => Ok(document),
        Err(first_err) => {
            debug!(target: TARGET_WEB_REQUEST, "Parse of {} failed ({}), retrying after cleanup", url, first_err);
            match parse_document(&cleanup_xml(text)) {
                Ok(document) => {
                    warn!(target: TARGET_WEB_REQUEST, "Document from {} parsed only after XML cleanup", url);
                    Ok(document)
                }
                Err(_) => Err(first_err),
            }
        }
    }
}

/// Fetches and validates the RSS index.
pub async fn load_index(client: &reqwest::Client, url: &str) -> Result<Channel, DocumentError> {
    let text = fetch_text(client, url).await?;
    let document = parse_xml(&text, url)?;
    let channel = validate_index_document(&document)?;
    debug!(target: TARGET_WEB_REQUEST, "Index {} lists {} items", url, channel.items.len());
    Ok(channel)
}

/// Fetches and validates one CAP alert.
pub async fn load_alert(client: &reqwest::Client, url: &str) -> Result<Alert, DocumentError> {
    let text = fetch_text(client, url).await?;
    let document = parse_xml(&text, url)?;
    let alert = validate_alert_document(&document)?;
    Ok(alert)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_xml_retries_after_cleanup() {
        let document = parse_xml("garbage<rss><title>A&nbsp;B</title></rss>", "test").unwrap();
        assert_eq!(document["rss"]["title"], "A\u{a0}B");
    }

    #[test]
    fn test_parse_xml_reports_first_error() {
        assert!(parse_xml("<rss><title></rss>", "test").is_err());
    }
}
