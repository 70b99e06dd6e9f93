//! The pipeline behind the map: index, per-alert fan-out, polygon aggregation.

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use super::parser::{load_alert, load_index};
use super::types::{AlertMap, DocumentError, FetchReport};
use crate::cap::{extract_polygons, IndexItem, Polygon};
use crate::shuffle::shuffle;
use crate::{TARGET_VALIDATION, TARGET_WEB_REQUEST};

/// Fetches the index at `feed_url`, then every alert it lists, and returns all of
/// their polygons.
///
/// Only a failure of the index itself is returned as an error. An alert that cannot
/// be fetched, parsed or validated is logged and contributes no polygons. Items are
/// shuffled before the fan-out, so result order carries no meaning.
///
/// `concurrency` caps the number of alerts in flight; `None` requests them all at once.
pub async fn collect_polygons(
    client: &reqwest::Client,
    feed_url: &str,
    concurrency: Option<usize>,
) -> Result<AlertMap, DocumentError> {
    let channel = load_index(client, feed_url).await.map_err(|err| {
        match err {
            DocumentError::Validation(_) => {
                error!(target: TARGET_VALIDATION, "Index {} failed validation: {}", feed_url, err)
            }
            _ => error!(target: TARGET_WEB_REQUEST, "Failed to load index {}: {}", feed_url, err),
        }
        err
    })?;

    let items = {
        let mut rng = rand::rng();
        shuffle(channel.items, &mut rng)
    };
    let mut report = FetchReport {
        items: items.len(),
        ..FetchReport::default()
    };

    // Each future owns its item so the handler future stays `Send` for axum.
    let fetches = items
        .into_iter()
        .map(|item| async move { alert_polygons(client, &item).await });
    let results: Vec<Result<Vec<Polygon>, DocumentError>> = match concurrency {
        Some(limit) => stream::iter(fetches).buffer_unordered(limit).collect().await,
        None => join_all(fetches).await,
    };

    let mut polygons = Vec::new();
    for result in results {
        match result {
            Ok(found) => {
                report.alerts_loaded += 1;
                if found.is_empty() {
                    report.alerts_without_polygons += 1;
                }
                polygons.extend(found);
            }
            Err(_) => report.alerts_failed += 1,
        }
    }
    report.polygons = polygons.len();

    info!(
        target: TARGET_WEB_REQUEST,
        "Loaded {} of {} alerts from {} ({} failed, {} without polygons), {} polygons",
        report.alerts_loaded,
        report.items,
        feed_url,
        report.alerts_failed,
        report.alerts_without_polygons,
        report.polygons
    );

    Ok(AlertMap { polygons, report })
}

async fn alert_polygons(
    client: &reqwest::Client,
    item: &IndexItem,
) -> Result<Vec<Polygon>, DocumentError> {
    match load_alert(client, &item.link).await {
        Ok(alert) => {
            let polygons = extract_polygons(&alert);
            debug!(target: TARGET_WEB_REQUEST, "Alert {} from {}: {} polygons", alert.identifier, item.link, polygons.len());
            Ok(polygons)
        }
        Err(DocumentError::Validation(err)) => {
            warn!(target: TARGET_VALIDATION, "Skipping alert {}: {}", item.link, err);
            Err(DocumentError::Validation(err))
        }
        Err(err) => {
            warn!(target: TARGET_WEB_REQUEST, "Skipping alert {}: {}", item.link, err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cap::fixtures::{rss_xml, simple_alert, POLYGON_A, POLYGON_B};
    use crate::cap::parse_polygon;
    use crate::feed::client::create_http_client;
    use crate::feed::types::FetchError;

    #[tokio::test]
    async fn test_bad_alert_does_not_hide_good_ones() {
        let mut server = mockito::Server::new_async().await;
        let links = vec![
            format!("{}/alerts/good-a.xml", server.url()),
            format!("{}/alerts/bad-category.xml", server.url()),
            format!("{}/alerts/missing.xml", server.url()),
            format!("{}/alerts/not-xml.xml", server.url()),
            format!("{}/alerts/good-b.xml", server.url()),
        ];

        let _index = server
            .mock("GET", "/rss.xml")
            .with_status(200)
            .with_header("content-type", "application/rss+xml")
            .with_body(rss_xml(&links))
            .create_async()
            .await;
        let _good_a = server
            .mock("GET", "/alerts/good-a.xml")
            .with_status(200)
            .with_body(simple_alert("Met", POLYGON_A))
            .create_async()
            .await;
        let _bad = server
            .mock("GET", "/alerts/bad-category.xml")
            .with_status(200)
            .with_body(simple_alert("NotARealCategory", POLYGON_B))
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/alerts/missing.xml")
            .with_status(404)
            .create_async()
            .await;
        let _not_xml = server
            .mock("GET", "/alerts/not-xml.xml")
            .with_status(200)
            .with_body("<alert><info>")
            .create_async()
            .await;
        let _good_b = server
            .mock("GET", "/alerts/good-b.xml")
            .with_status(200)
            .with_body(simple_alert("Fire", POLYGON_B))
            .create_async()
            .await;

        let client = create_http_client().unwrap();
        let map = collect_polygons(&client, &format!("{}/rss.xml", server.url()), None)
            .await
            .unwrap();

        assert_eq!(
            map.report,
            FetchReport {
                items: 5,
                alerts_loaded: 2,
                alerts_failed: 3,
                alerts_without_polygons: 0,
                polygons: 2,
            }
        );
        assert_eq!(map.polygons.len(), 2);
        assert!(map.polygons.contains(&parse_polygon(POLYGON_A).unwrap()));
        assert!(map.polygons.contains(&parse_polygon(POLYGON_B).unwrap()));
    }

    #[tokio::test]
    async fn test_concurrency_limit_collects_everything() {
        let mut server = mockito::Server::new_async().await;
        let links: Vec<String> = (0..6)
            .map(|i| format!("{}/alerts/{}.xml", server.url(), i))
            .collect();
        let _index = server
            .mock("GET", "/rss.xml")
            .with_status(200)
            .with_body(rss_xml(&links))
            .create_async()
            .await;
        let alerts = server
            .mock("GET", mockito::Matcher::Regex(r"^/alerts/\d+\.xml$".to_string()))
            .with_status(200)
            .with_body(simple_alert("Met", POLYGON_A))
            .expect(6)
            .create_async()
            .await;

        let client = create_http_client().unwrap();
        let map = collect_polygons(&client, &format!("{}/rss.xml", server.url()), Some(2))
            .await
            .unwrap();

        assert_eq!(map.report.alerts_loaded, 6);
        assert_eq!(map.polygons.len(), 6);
        alerts.assert_async().await;
    }

    #[tokio::test]
    async fn test_collect_runs_on_spawned_task() {
        let mut server = mockito::Server::new_async().await;
        let links: Vec<String> = (0..3)
            .map(|i| format!("{}/alerts/{}.xml", server.url(), i))
            .collect();
        let _index = server
            .mock("GET", "/rss.xml")
            .with_status(200)
            .with_body(rss_xml(&links))
            .create_async()
            .await;
        let _alerts = server
            .mock("GET", mockito::Matcher::Regex(r"^/alerts/\d+\.xml$".to_string()))
            .with_status(200)
            .with_body(simple_alert("Met", POLYGON_A))
            .expect(6)
            .create_async()
            .await;

        let client = create_http_client().unwrap();
        let feed_url = format!("{}/rss.xml", server.url());
        let handle = tokio::spawn(async move {
            let unbounded = collect_polygons(&client, &feed_url, None).await;
            let capped = collect_polygons(&client, &feed_url, Some(2)).await;
            (unbounded, capped)
        });
        let (unbounded, capped) = handle.await.unwrap();

        assert_eq!(unbounded.unwrap().polygons.len(), 3);
        assert_eq!(capped.unwrap().polygons.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_index_means_no_alerts() {
        let mut server = mockito::Server::new_async().await;
        let _index = server
            .mock("GET", "/rss.xml")
            .with_status(200)
            .with_body(rss_xml(&[]))
            .create_async()
            .await;

        let client = create_http_client().unwrap();
        let map = collect_polygons(&client, &format!("{}/rss.xml", server.url()), None)
            .await
            .unwrap();
        assert!(map.no_alerts());
        assert!(map.polygons.is_empty());
    }

    #[tokio::test]
    async fn test_single_bare_item_means_no_alerts() {
        let mut server = mockito::Server::new_async().await;
        let links = vec![format!("{}/alerts/only.xml", server.url())];
        let _index = server
            .mock("GET", "/rss.xml")
            .with_status(200)
            .with_body(rss_xml(&links))
            .create_async()
            .await;
        let alert = server
            .mock("GET", "/alerts/only.xml")
            .with_status(200)
            .with_body(simple_alert("Met", POLYGON_A))
            .expect(0)
            .create_async()
            .await;

        let client = create_http_client().unwrap();
        let map = collect_polygons(&client, &format!("{}/rss.xml", server.url()), None)
            .await
            .unwrap();
        assert!(map.no_alerts());
        alert.assert_async().await;
    }

    #[tokio::test]
    async fn test_index_failures_abort() {
        let mut server = mockito::Server::new_async().await;
        let _down = server
            .mock("GET", "/down.xml")
            .with_status(503)
            .create_async()
            .await;
        let _invalid = server
            .mock("GET", "/invalid.xml")
            .with_status(200)
            .with_body("<rss><channel><description>no title</description></channel></rss>")
            .create_async()
            .await;

        let client = create_http_client().unwrap();

        let err = collect_polygons(&client, &format!("{}/down.xml", server.url()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Fetch(FetchError::Status { .. })));

        let err = collect_polygons(&client, &format!("{}/invalid.xml", server.url()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Validation(_)));

        let err = collect_polygons(&client, "not a url", None).await.unwrap_err();
        assert!(matches!(err, DocumentError::Fetch(FetchError::InvalidUrl(_))));
    }
}
