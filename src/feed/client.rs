//! HTTP client creation and request handling for feed documents.

use reqwest::header;
use tracing::debug;

use super::types::{FetchError, ACCEPT_XML, USER_AGENT};
use super::util::decode_body;
use crate::util::is_valid_url;
use crate::TARGET_WEB_REQUEST;

/// One client is shared by every request so connections are pooled.
pub fn create_http_client() -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .gzip(true)
        .redirect(reqwest::redirect::Policy::default())
        .build()
        .map_err(FetchError::Client)
}

/// GETs a document and returns its body as text.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    if !is_valid_url(url) {
        return Err(FetchError::InvalidUrl(url.to_string()));
    }

    debug!(target: TARGET_WEB_REQUEST, "Requesting {}", url);
    let response = client
        .get(url)
        .header(header::ACCEPT, ACCEPT_XML)
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .map(|s| s.to_lowercase());

    let bytes = response.bytes().await.map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })?;
    debug!(target: TARGET_WEB_REQUEST, "Received {} bytes from {} ({:?})", bytes.len(), url, content_type);

    Ok(decode_body(&bytes, content_type.as_deref()))
}
