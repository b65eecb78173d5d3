//! Projects API client
//!
//! Fetches the project showcase from the portfolio API. The list is cached on
//! disk; when the API is unavailable an expired cached list is served instead.

use chrono::Duration;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::Project;
use crate::cache::CacheManager;

/// Cache key for the project list
pub const CACHE_KEY: &str = "projects";

/// Errors that can occur when fetching projects
#[derive(Debug, Error)]
pub enum ProjectsError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("Projects endpoint returned HTTP {0}")]
    HttpStatus(StatusCode),

    /// Failed to parse API response
    #[error("Failed to parse projects: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Accepted shapes of the projects response
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProjectsPayload {
    List(Vec<Project>),
    Wrapped { projects: Vec<Project> },
}

impl ProjectsPayload {
    fn into_projects(self) -> Vec<Project> {
        match self {
            ProjectsPayload::List(projects) | ProjectsPayload::Wrapped { projects } => projects,
        }
    }
}

/// Projects fetched from the API or the cache
#[derive(Debug, Clone)]
pub struct ProjectList {
    pub projects: Vec<Project>,
    /// True when served from an expired cache entry after an API failure
    pub is_stale: bool,
}

/// Client for the projects endpoint
#[derive(Debug, Clone)]
pub struct ProjectsClient {
    http_client: Client,
    endpoint: Url,
    cache_manager: Option<CacheManager>,
    cache_ttl: Duration,
}

impl ProjectsClient {
    /// Creates a client without a cache
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    /// Creates a client with a custom HTTP client and no cache
    pub fn with_client(http_client: Client, endpoint: Url) -> Self {
        Self {
            http_client,
            endpoint,
            cache_manager: None,
            cache_ttl: Duration::hours(1),
        }
    }

    /// Enables disk caching of the project list
    pub fn with_cache(mut self, cache_manager: CacheManager, ttl: Duration) -> Self {
        self.cache_manager = Some(cache_manager);
        self.cache_ttl = ttl;
        self
    }

    /// Fetches the project list
    ///
    /// # Arguments
    /// * `force_refresh` - Skip a fresh cache entry and go to the API
    ///
    /// # Behavior
    /// - Returns fresh cached data unless `force_refresh` is set
    /// - Otherwise fetches from the API and caches the result
    /// - On API failure, returns expired cache data if available
    pub async fn fetch_projects(&self, force_refresh: bool) -> Result<ProjectList, ProjectsError> {
        if !force_refresh {
            if let Some(ref cache_manager) = self.cache_manager {
                if let Some(cached) = cache_manager.read::<Vec<Project>>(CACHE_KEY) {
                    if !cached.is_expired {
                        debug!("Serving {} projects from cache", cached.data.len());
                        return Ok(ProjectList {
                            projects: cached.data,
                            is_stale: false,
                        });
                    }
                }
            }
        }

        match self.fetch_from_api().await {
            Ok(projects) => {
                if let Some(ref cache_manager) = self.cache_manager {
                    if let Err(e) = cache_manager.write(CACHE_KEY, &projects, self.cache_ttl) {
                        warn!("Failed to cache projects: {}", e);
                    }
                }
                Ok(ProjectList {
                    projects,
                    is_stale: false,
                })
            }
            Err(api_error) => {
                if let Some(ref cache_manager) = self.cache_manager {
                    if let Some(cached) = cache_manager.read::<Vec<Project>>(CACHE_KEY) {
                        warn!("Projects API failed ({}), serving cached list", api_error);
                        return Ok(ProjectList {
                            projects: cached.data,
                            is_stale: true,
                        });
                    }
                }
                Err(api_error)
            }
        }
    }

    async fn fetch_from_api(&self) -> Result<Vec<Project>, ProjectsError> {
        debug!("Requesting projects from {}", self.endpoint);
        let response = self.http_client.get(self.endpoint.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProjectsError::HttpStatus(status));
        }

        let text = response.text().await?;
        let payload: ProjectsPayload = serde_json::from_str(&text)?;
        Ok(payload.into_projects())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_body() -> serde_json::Value {
        serde_json::json!([
            {
                "id": 1,
                "projectName": "Portfolio",
                "desc": "This site",
                "projectDate": "2024",
                "imgUrl": "https://s3/p.png",
                "tags": ["React", "", "AWS"]
            },
            {
                "id": "b",
                "projectName": "Compiler",
                "description": "A toy compiler",
                "date": "2023",
                "imgUrl": "https://s3/c.png"
            }
        ])
    }

    async fn projects_server(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/projects"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    fn endpoint(server: &MockServer) -> Url {
        Url::parse(&format!("{}/api/projects", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_parses_and_keeps_order() {
        let server = projects_server(ResponseTemplate::new(200).set_body_json(sample_body())).await;
        let client = ProjectsClient::new(endpoint(&server));

        let list = client.fetch_projects(false).await.unwrap();

        assert!(!list.is_stale);
        assert_eq!(list.projects.len(), 2);
        assert_eq!(list.projects[0].project_name, "Portfolio");
        assert_eq!(list.projects[0].id, "1");
        assert_eq!(list.projects[0].tags, vec!["React", "AWS"]);
        assert_eq!(list.projects[1].description, "A toy compiler");
        assert!(list.projects[1].tags.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_accepts_wrapped_payload() {
        let body = serde_json::json!({ "projects": sample_body() });
        let server = projects_server(ResponseTemplate::new(200).set_body_json(body)).await;

        let list = ProjectsClient::new(endpoint(&server))
            .fetch_projects(false)
            .await
            .unwrap();

        assert_eq!(list.projects.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_error_without_cache() {
        let server = projects_server(ResponseTemplate::new(500)).await;

        let result = ProjectsClient::new(endpoint(&server)).fetch_projects(false).await;

        assert!(matches!(result, Err(ProjectsError::HttpStatus(_))));
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_api() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        let cached: Vec<Project> = serde_json::from_value(sample_body()).unwrap();
        cache.write(CACHE_KEY, &cached, Duration::hours(1)).unwrap();

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client =
            ProjectsClient::new(endpoint(&server)).with_cache(cache, Duration::hours(1));
        let list = client.fetch_projects(false).await.unwrap();

        assert_eq!(list.projects.len(), 2);
    }

    #[tokio::test]
    async fn test_api_failure_serves_expired_cache() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        let cached: Vec<Project> = serde_json::from_value(sample_body()).unwrap();
        cache.write(CACHE_KEY, &cached, Duration::zero()).unwrap();

        let server = projects_server(ResponseTemplate::new(502)).await;
        let client =
            ProjectsClient::new(endpoint(&server)).with_cache(cache, Duration::hours(1));

        let list = client.fetch_projects(false).await.unwrap();

        assert!(list.is_stale);
        assert_eq!(list.projects[0].project_name, "Portfolio");
    }

    #[tokio::test]
    async fn test_force_refresh_updates_cache() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        cache
            .write(CACHE_KEY, &Vec::<Project>::new(), Duration::hours(1))
            .unwrap();

        let server = projects_server(ResponseTemplate::new(200).set_body_json(sample_body())).await;
        let client = ProjectsClient::new(endpoint(&server))
            .with_cache(cache.clone(), Duration::hours(1));

        let list = client.fetch_projects(true).await.unwrap();
        assert_eq!(list.projects.len(), 2);

        let stored = cache.read::<Vec<Project>>(CACHE_KEY).unwrap();
        assert_eq!(stored.data.len(), 2);
    }
}
