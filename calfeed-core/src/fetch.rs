//! Feed fetch collaborator.

use std::future::Future;
use std::time::Duration;

use url::Url;

use crate::error::{CalFeedError, CalFeedResult};

/// Schemes a feed URL may use.
const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "webcal", "webcals", "file"];

const USER_AGENT: &str = concat!("calfeed/", env!("CARGO_PKG_VERSION"));

/// Retrieves raw feed bytes.
pub trait FeedFetcher: Send + Sync {
    fn fetch_text(&self, url: &str) -> impl Future<Output = CalFeedResult<Vec<u8>>> + Send;
}

/// Check that `url` parses and uses a scheme we know how to fetch.
pub fn validate_feed_url(url: &str) -> CalFeedResult<Url> {
    let parsed = Url::parse(url).map_err(|e| CalFeedError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if !SUPPORTED_SCHEMES.contains(&parsed.scheme()) {
        return Err(CalFeedError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    Ok(parsed)
}

/// Fetches feeds over HTTP(S), `webcal://` (as HTTPS) and `file://`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> CalFeedResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CalFeedError::Config(format!("Could not build HTTP client: {e}")))?;

        Ok(HttpFetcher { client })
    }
}

impl FeedFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> CalFeedResult<Vec<u8>> {
        let parsed = validate_feed_url(url)?;
        let fetch_error = |reason: String| CalFeedError::Fetch {
            url: url.to_string(),
            reason,
        };

        let target = match parsed.scheme() {
            "file" => {
                let path = parsed
                    .to_file_path()
                    .map_err(|_| fetch_error("not a local file path".into()))?;
                return tokio::fs::read(&path)
                    .await
                    .map_err(|e| fetch_error(e.to_string()));
            }
            // webcal:// is a hint to calendar apps; the transport is plain HTTP(S)
            "webcal" | "webcals" => {
                format!("https{}", &parsed.as_str()[parsed.scheme().len()..])
            }
            _ => parsed.to_string(),
        };

        tracing::debug!(url = %target, "fetching feed");

        let response = self
            .client
            .get(&target)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_error(e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_feed_url() {
        assert!(validate_feed_url("https://example.edu/feed/climbingWall.ics").is_ok());
        assert!(validate_feed_url("webcal://example.edu/feed.ics").is_ok());
        assert!(validate_feed_url("file:///tmp/feed.ics").is_ok());

        assert!(matches!(
            validate_feed_url("not a url"),
            Err(CalFeedError::InvalidUrl { .. })
        ));
        assert!(matches!(
            validate_feed_url("ftp://example.edu/feed.ics"),
            Err(CalFeedError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_reads_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.ics");
        std::fs::write(&path, "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n").unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let body = fetcher.fetch_text(url.as_str()).await.unwrap();

        assert_eq!(body, b"BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n");
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("missing.ics")).unwrap();

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetcher.fetch_text(url.as_str()).await.unwrap_err();

        assert!(matches!(err, CalFeedError::Fetch { .. }));
        assert!(err.is_fatal());
    }
}
