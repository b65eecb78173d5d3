//! Presigned resume link client
//!
//! The files endpoint answers `GET /api/files/<name>` with `{"url": "..."}`,
//! a time-limited download link for the stored resume.

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when fetching the resume link
#[derive(Debug, Error)]
pub enum ResumeError {
    /// HTTP request failed
    #[error("Failed to fetch resume URL: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("Failed to fetch resume URL: HTTP {0}")]
    HttpStatus(StatusCode),

    /// The endpoint answered 2xx but without a usable `url`
    #[error("Invalid response format")]
    InvalidResponse,
}

/// Response body of the files endpoint
#[derive(Debug, Deserialize)]
struct PresignedUrlResponse {
    #[serde(default)]
    url: Option<String>,
}

/// Client for the presigned resume URL endpoint
#[derive(Debug, Clone)]
pub struct ResumeClient {
    http_client: Client,
    endpoint: Url,
}

impl ResumeClient {
    /// Creates a client for the given endpoint (already including the file name)
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(http_client: Client, endpoint: Url) -> Self {
        Self {
            http_client,
            endpoint,
        }
    }

    /// Fetches a fresh presigned URL
    ///
    /// # Returns
    /// * `Ok(String)` - The download link
    /// * `Err(ResumeError)` - Transport failure, non-2xx status, or a body without `url`
    pub async fn fetch_presigned_url(&self) -> Result<String, ResumeError> {
        debug!("Requesting resume URL from {}", self.endpoint);
        let response = self.http_client.get(self.endpoint.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResumeError::HttpStatus(status));
        }

        let text = response.text().await?;
        parse_presigned_url(&text)
    }
}

/// Extracts the `url` field from a response body
fn parse_presigned_url(body: &str) -> Result<String, ResumeError> {
    serde_json::from_str::<PresignedUrlResponse>(body)
        .ok()
        .and_then(|response| response.url)
        .filter(|url| !url.trim().is_empty())
        .ok_or(ResumeError::InvalidResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_valid_body() {
        let url = parse_presigned_url(r#"{"url": "https://s3/x.pdf", "expiresIn": 3600}"#).unwrap();
        assert_eq!(url, "https://s3/x.pdf");
    }

    #[test]
    fn test_parse_missing_url_is_invalid() {
        let result = parse_presigned_url(r#"{"link": "https://s3/x.pdf"}"#);
        assert!(matches!(result, Err(ResumeError::InvalidResponse)));
    }

    #[test]
    fn test_parse_empty_or_null_url_is_invalid() {
        assert!(parse_presigned_url(r#"{"url": ""}"#).is_err());
        assert!(parse_presigned_url(r#"{"url": null}"#).is_err());
    }

    #[test]
    fn test_parse_non_json_is_invalid() {
        let result = parse_presigned_url("<html>oops</html>");
        assert!(matches!(result, Err(ResumeError::InvalidResponse)));
    }

    #[test]
    fn test_invalid_response_message() {
        assert_eq!(ResumeError::InvalidResponse.to_string(), "Invalid response format");
    }

    #[tokio::test]
    async fn test_fetch_hits_files_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/files/resume.pdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "url": "https://s3/x.pdf" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = Url::parse(&format!("{}/api/files/resume.pdf", server.uri())).unwrap();
        let client = ResumeClient::new(endpoint);

        assert_eq!(client.fetch_presigned_url().await.unwrap(), "https://s3/x.pdf");
    }

    #[tokio::test]
    async fn test_fetch_reports_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let endpoint = Url::parse(&format!("{}/api/files/resume.pdf", server.uri())).unwrap();
        let result = ResumeClient::new(endpoint).fetch_presigned_url().await;

        match result {
            Err(ResumeError::HttpStatus(status)) => assert_eq!(status.as_u16(), 503),
            other => panic!("Expected HttpStatus error, got {:?}", other),
        }
    }
}
