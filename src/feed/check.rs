//! Feed diagnostics: validate the index and report on every alert it lists.

use futures::future::join_all;

use super::client::fetch_text;
use super::parser::{load_index, parse_xml};
use super::types::{DocumentError, FeedCheck, ItemCheck, ItemStatus};
use crate::cap::{extract_polygons, validate_alert_document, IndexItem};

/// Checks a feed, optionally only its first `limit` items, keeping feed order.
pub async fn check_feed(
    client: &reqwest::Client,
    url: &str,
    limit: Option<usize>,
) -> Result<FeedCheck, DocumentError> {
    let channel = load_index(client, url).await?;
    let take = limit.unwrap_or(channel.items.len());

    let items = join_all(
        channel
            .items
            .iter()
            .take(take)
            .map(|item| check_item(client, item)),
    )
    .await;

    Ok(FeedCheck {
        url: url.to_string(),
        channel_title: channel.title,
        items,
    })
}

async fn check_item(client: &reqwest::Client, item: &IndexItem) -> ItemCheck {
    let mut check = ItemCheck {
        title: item.title.clone(),
        link: item.link.clone(),
        status: ItemStatus::Ok,
        info_blocks: 0,
        areas: 0,
        polygons: 0,
        error: None,
    };

    let text = match fetch_text(client, &item.link).await {
        Ok(text) => text,
        Err(err) => {
            check.status = ItemStatus::FetchFailed;
            check.error = Some(err.to_string());
            return check;
        }
    };

    let document = match parse_xml(&text, &item.link) {
        Ok(document) => document,
        Err(err) => {
            check.status = ItemStatus::InvalidXml;
            check.error = Some(err.to_string());
            return check;
        }
    };

    match validate_alert_document(&document) {
        Ok(alert) => {
            check.info_blocks = alert.info.len();
            check.areas = alert.info.iter().map(|info| info.areas.len()).sum();
            check.polygons = extract_polygons(&alert).len();
        }
        Err(err) => {
            check.status = ItemStatus::InvalidAlert;
            check.error = Some(err.to_string());
        }
    }
    check
}
