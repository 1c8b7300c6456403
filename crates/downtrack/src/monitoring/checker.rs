use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::TransportError;

/// Most idle keep-alive connections held per host between cycles
const MAX_IDLE_PER_HOST: usize = 10;
const IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Transport used by the prober to issue one GET.
///
/// Implementations return the response status code once the body has been
/// consumed, or a [`TransportError`] if no response arrived.
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    async fn get(&self, url: &Url) -> Result<u16, TransportError>;
}

/// HTTPS checker backed by a shared, connection-pooled reqwest client.
///
/// Target schemes are enforced by the prober before any request; redirects
/// are followed to whatever scheme the site sends and the final status wins.
#[derive(Debug, Clone)]
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .pool_idle_timeout(IDLE_TIMEOUT)
            .user_agent(concat!("downtrack/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn get(&self, url: &Url) -> Result<u16, TransportError> {
        let mut response = self.client.get(url.clone()).send().await?;
        let status_code = response.status().as_u16();

        // Drain the body so the connection goes back to the pool
        loop {
            match response.chunk().await {
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(e) => {
                    debug!(url = %url, error = %e, "Body drain interrupted, connection will not be reused");
                    break;
                }
            }
        }

        Ok(status_code)
    }
}
