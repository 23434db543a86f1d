//! Final-URL resolution for deployed sites.

use crate::config::NetworkConfig;
use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::time::Duration;
use tracing::{debug, warn};

/// Resolves the URL a site should start at.
///
/// Implementations fail open: any failure yields the input unchanged.
#[async_trait]
pub trait UrlResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> String;
}

/// Follows HTTP redirects with a HEAD request.
pub struct HttpResolver {
    client: Option<Client>,
}

impl HttpResolver {
    pub fn new() -> Self {
        Self::with_timeout(NetworkConfig::REDIRECT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::limited(NetworkConfig::MAX_REDIRECTS))
            .user_agent(NetworkConfig::PROBE_USER_AGENT)
            .build();

        match client {
            Ok(client) => Self {
                client: Some(client),
            },
            Err(e) => {
                warn!("Failed to build HTTP client, redirects will not be resolved: {}", e);
                Self { client: None }
            }
        }
    }
}

impl Default for HttpResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlResolver for HttpResolver {
    async fn resolve(&self, url: &str) -> String {
        let Some(client) = &self.client else {
            return url.to_string();
        };

        match client.head(url).send().await {
            Ok(response) => {
                let final_url = response.url().to_string();
                if final_url != url {
                    debug!("Resolved {} -> {}", url, final_url);
                }
                final_url
            }
            Err(e) => {
                debug!("Could not resolve {}, using it as-is: {}", url, e);
                url.to_string()
            }
        }
    }
}

/// Returns every URL unchanged. Used offline and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

#[async_trait]
impl UrlResolver for NoopResolver {
    async fn resolve(&self, url: &str) -> String {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_resolver() {
        assert_eq!(NoopResolver.resolve("http://example.com").await, "http://example.com");
    }

    #[tokio::test]
    async fn test_http_resolver_fails_open() {
        // Port 9 (discard) on loopback refuses connections.
        let resolver = HttpResolver::with_timeout(Duration::from_millis(500));
        assert_eq!(
            resolver.resolve("http://127.0.0.1:9/app").await,
            "http://127.0.0.1:9/app"
        );
        assert_eq!(resolver.resolve("not a url").await, "not a url");
    }
}
