use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{Error, Result};
use crate::tile::Tile;
use crate::url::UrlFormat;

pub(crate) const BACKOFF_DELAY: Duration = Duration::from_secs(10);
const ZERO_DURATION: Duration = Duration::from_secs(0);

/// Remote origin for tile bytes.
///
/// Abstracting the network behind a trait keeps the fetch pipeline
/// testable without a tile server on the other end.
#[async_trait]
pub trait TileSource: Send + Sync {
    /// Fetches the raw bytes for a single tile.
    async fn fetch(&self, tile: &Tile) -> Result<Vec<u8>>;
}

/// Tile source backed by a slippy-map HTTP server.
///
/// Sends an identifying `User-Agent` with every request (mandatory under
/// the usage policy of the public OSM servers), honours `Retry-After` on
/// HTTP 429 and retries other failures a bounded number of times with a
/// fixed backoff delay.
pub struct HttpSource {
    client: reqwest::Client,
    url: UrlFormat,
    retries: u8,
}

impl HttpSource {
    /// Builds the HTTP client. Pass the zero duration to disable the
    /// per-request timeout.
    pub fn new(url: UrlFormat, user_agent: &str, timeout: Duration, retries: u8) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if timeout > ZERO_DURATION {
            builder = builder.timeout(timeout);
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.append(
            reqwest::header::USER_AGENT,
            user_agent.parse().map_err(|_| {
                Error::InvalidInput(format!(
                    "user agent {user_agent:?} is not a valid header value"
                ))
            })?,
        );

        let client = builder
            .default_headers(headers)
            .build()
            .map_err(|err| Error::InvalidInput(format!("failed creating HTTP client: {err}")))?;

        Ok(Self {
            client,
            url,
            retries,
        })
    }

    async fn try_fetch(&self, tile: &Tile) -> Result<Vec<u8>> {
        let formatted_url = self.url.tile_url(tile)?;

        loop {
            let response = self
                .client
                .get(&formatted_url)
                .send()
                .await
                .map_err(|err| Error::fetch(*tile, err.to_string()))?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|val| val.parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(BACKOFF_DELAY);

                debug!(
                    zoom = tile.z,
                    x = tile.x,
                    y = tile.y,
                    delay_secs = retry_after.as_secs(),
                    "rate limited, backing off"
                );
                tokio::time::sleep(retry_after).await;
                continue;
            }

            let status = response.status();
            if !status.is_success() {
                return Err(Error::fetch(
                    *tile,
                    format!("server responded with status {status}"),
                ));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|err| Error::fetch(*tile, err.to_string()))?;

            return Ok(bytes.to_vec());
        }
    }
}

#[async_trait]
impl TileSource for HttpSource {
    async fn fetch(&self, tile: &Tile) -> Result<Vec<u8>> {
        let mut attempt = 0;

        loop {
            match self.try_fetch(tile).await {
                Ok(bytes) => return Ok(bytes),
                // a broken URL template won't improve with retrying
                Err(err @ Error::InvalidInput(_)) => return Err(err),
                Err(err) => {
                    attempt += 1;
                    if attempt > self.retries {
                        return Err(err);
                    }

                    debug!(
                        zoom = tile.z,
                        x = tile.x,
                        y = tile.y,
                        attempt,
                        error = %err,
                        "retrying tile fetch"
                    );
                    tokio::time::sleep(BACKOFF_DELAY).await;
                }
            }
        }
    }
}
