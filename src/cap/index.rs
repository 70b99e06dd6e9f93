//! The RSS index that lists CAP alerts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::schema::{Fields, FromNode, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub title: String,
    pub url: String,
    pub link: String,
}

impl FromNode for Image {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let fields = Fields::new(node, path)?;
        Ok(Image {
            title: fields.required("title")?,
            url: fields.required("url")?,
            link: fields.required("link")?,
        })
    }
}

/// One `<item>` of the index. `link` points at the CAP document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexItem {
    pub title: String,
    pub link: String,
    pub pub_date: DateTime<Utc>,
    pub description: Option<String>,
    pub updated: Option<String>,
    pub rel_link: Option<String>,
    pub source_feed: Option<String>,
    pub alert_id: Option<String>,
    pub copyright: Option<String>,
    pub iso_pub_date: Option<DateTime<Utc>>,
    pub preservation_copy: Option<String>,
}

impl FromNode for IndexItem {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let fields = Fields::new(node, path)?;
        Ok(IndexItem {
            title: fields.required("title")?,
            link: fields.required("link")?,
            pub_date: fields.required("pubDate")?,
            description: fields.optional("description")?,
            updated: fields.optional("updated")?,
            rel_link: fields.optional("relLink")?,
            source_feed: fields.optional("sourceFeed")?,
            alert_id: fields.optional("alertId")?,
            copyright: fields.optional("copyright")?,
            iso_pub_date: fields.optional("isoPubDate")?,
            preservation_copy: fields.optional("preservationCopy")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub links: Vec<String>,
    pub title: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub copyright: Option<String>,
    pub pub_date: Option<String>,
    pub docs: Option<String>,
    pub image: Option<Image>,
    pub ccfeedver: Option<String>,
    pub last_build_date: Option<String>,
    pub items: Vec<IndexItem>,
}

impl FromNode for Channel {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let fields = Fields::new(node, path)?;
        Ok(Channel {
            links: fields.many("link")?,
            title: fields.required("title")?,
            description: fields.optional("description")?,
            language: fields.optional("language")?,
            copyright: fields.optional("copyright")?,
            pub_date: fields.optional("pubDate")?,
            docs: fields.optional("docs")?,
            image: fields.optional("image")?,
            ccfeedver: fields.optional("ccfeedver")?,
            last_build_date: fields.optional("lastBuildDate")?,
            items: fields.list("item")?,
        })
    }
}

/// Validates a parsed index document (`{"rss": {"channel": {...}}}`) into its channel.
pub fn validate_index_document(document: &Value) -> Result<Channel, ValidationError> {
    Fields::new(document, "")?.nested("rss", |rss| rss.required("channel"))
}
