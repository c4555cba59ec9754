//! Single-shot HTTP reachability probe.
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::models::ProbeResult;
use crate::version::user_agent;

/// Only this many bytes of the response body are inspected for the marker.
pub const BODY_SNIFF_LIMIT: usize = 4096;

/// Anything that can report the current reachability of the monitored service.
#[async_trait]
pub trait ServiceProbe {
    /// Runs one check. Never fails: every failure mode maps to a down result.
    async fn probe(&self) -> ProbeResult;

    /// The target being probed, used in alert messages.
    fn target(&self) -> &str;
}

/// The endpoint counts as up only on a 200 whose body carries the marker.
pub fn is_healthy_response(status_code: u16, body: &str, marker: &str) -> bool {
    status_code == 200 && body.contains(marker)
}

/// Probes a URL with a GET request and sniffs the start of the body.
pub struct HttpProber {
    client: Client,
    url: String,
    marker: String,
}

impl HttpProber {
    pub fn new(url: &str, marker: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent())
            .build()?;
        Ok(Self::with_client(client, url, marker))
    }

    pub fn with_client(client: Client, url: &str, marker: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            marker: marker.to_string(),
        }
    }

    async fn classify(&self, mut response: Response) -> ProbeResult {
        let status_code = response.status().as_u16();
        let body = match read_body_prefix(&mut response, BODY_SNIFF_LIMIT).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(url = %self.url, status = status_code, error = %e, "Failed to read probe response body.");
                return ProbeResult::unreachable();
            }
        };
        let body = String::from_utf8_lossy(&body);

        if is_healthy_response(status_code, &body, &self.marker) {
            ProbeResult::up(status_code)
        } else {
            if status_code == 200 {
                warn!(url = %self.url, marker = %self.marker, "Response is missing the expected marker.");
            } else {
                warn!(url = %self.url, status = status_code, "Probe returned a non-200 status.");
            }
            ProbeResult::down(status_code)
        }
    }
}

#[async_trait]
impl ServiceProbe for HttpProber {
    async fn probe(&self) -> ProbeResult {
        let start_time = Instant::now();
        let result = match self.client.get(&self.url).send().await {
            Ok(response) => self.classify(response).await,
            Err(e) => {
                if e.is_timeout() {
                    warn!(url = %self.url, "Probe request timed out.");
                } else {
                    warn!(url = %self.url, error = %e, "Probe request failed.");
                }
                ProbeResult::unreachable()
            }
        };
        info!(
            url = %self.url,
            status = %result.status,
            http_code = result.http_code,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Probe finished."
        );
        result
    }

    fn target(&self) -> &str {
        &self.url
    }
}

/// Reads at most `limit` bytes of the body, leaving the rest of the stream unread.
async fn read_body_prefix(response: &mut Response, limit: usize) -> Result<Vec<u8>, reqwest::Error> {
    let mut buf = Vec::with_capacity(limit);
    while buf.len() < limit {
        match response.chunk().await? {
            Some(chunk) => {
                let take = (limit - buf.len()).min(chunk.len());
                buf.extend_from_slice(&chunk[..take]);
            }
            None => break,
        }
    }
    debug!(bytes = buf.len(), "Read probe body prefix.");
    Ok(buf)
}
