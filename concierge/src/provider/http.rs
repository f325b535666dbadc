//! HTTP client abstraction for testability

use futures::future::BoxFuture;

use super::types::LookupError;

/// User agent sent with every lookup request.
pub const USER_AGENT: &str = concat!("concierge-kiosk/", env!("CARGO_PKG_VERSION"));

/// Trait for async HTTP GET operations.
///
/// This abstraction allows lookup providers to be exercised against canned
/// responses in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request and returns the response body.
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, LookupError>>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the given timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LookupError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Creates a new ReqwestClient with a 10 second timeout.
    pub fn new() -> Result<Self, LookupError> {
        Self::with_timeout(10)
    }
}

impl HttpClient for ReqwestClient {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, LookupError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| LookupError::HttpError(format!("Request failed: {}", e)))?;

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS
                || status == reqwest::StatusCode::FORBIDDEN
            {
                return Err(LookupError::Unavailable(format!("HTTP {} from {}", status, url)));
            }
            if !status.is_success() {
                return Err(LookupError::HttpError(format!("HTTP {} from {}", status, url)));
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| LookupError::HttpError(format!("Failed to read response: {}", e)))
        })
    }
}
