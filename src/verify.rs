//! Availability checks against a listing's product page.
//!
//! A check is a single GET with redirects followed. The listing counts as
//! available only when the final response is a success, the final URL is not
//! the marketplace's error route, and the page carries none of the
//! [`UNAVAILABLE_MARKERS`](crate::config::UNAVAILABLE_MARKERS). Failures are
//! values, never errors: a timeout or refused connection is just another way of
//! being unavailable, and nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::debug;

use crate::config;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// Final response status was not 2xx.
    Status(u16),
    /// Redirected onto the error route.
    ErrorRoute(String),
    /// Page body contains an unavailable marker.
    Marker(&'static str),
    /// Timeout, connection failure, or unreadable body.
    Network(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable(UnavailableReason),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// Decide availability from a fetched page.
pub fn classify_page(status: u16, final_url: &str, body: &str) -> Availability {
    if !(200..300).contains(&status) {
        return Availability::Unavailable(UnavailableReason::Status(status));
    }
    if final_url.contains(config::ERROR_ROUTE_MARKER) {
        return Availability::Unavailable(UnavailableReason::ErrorRoute(final_url.to_string()));
    }
    let body = body.to_lowercase();
    match config::UNAVAILABLE_MARKERS
        .iter()
        .find(|marker| body.contains(*marker))
    {
        Some(marker) => Availability::Unavailable(UnavailableReason::Marker(*marker)),
        None => Availability::Available,
    }
}

/// Checks whether a product page still offers the listing.
#[async_trait]
pub trait LinkVerifier: Send + Sync {
    async fn check(&self, url: &str) -> Availability;
}

/// [`LinkVerifier`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpLinkVerifier {
    client: Client,
}

impl HttpLinkVerifier {
    /// Build a verifier whose requests are each bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(config::MAX_REDIRECTS))
            .user_agent(config::USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LinkVerifier for HttpLinkVerifier {
    async fn check(&self, url: &str) -> Availability {
        let availability = match self.client.get(url).send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                let final_url = resp.url().to_string();
                if !resp.status().is_success() {
                    Availability::Unavailable(UnavailableReason::Status(status))
                } else {
                    match resp.text().await {
                        Ok(body) => classify_page(status, &final_url, &body),
                        Err(e) => {
                            Availability::Unavailable(UnavailableReason::Network(e.to_string()))
                        }
                    }
                }
            }
            Err(e) => Availability::Unavailable(UnavailableReason::Network(e.to_string())),
        };
        if let Availability::Unavailable(reason) = &availability {
            debug!(url, ?reason, "listing unavailable");
        }
        availability
    }
}
