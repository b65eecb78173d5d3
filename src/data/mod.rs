//! Portfolio API data models and clients
//!
//! This module contains the records exchanged with the portfolio API and the
//! clients for its three endpoints: resume links, projects, and contact.

pub mod contact;
pub mod projects;
pub mod resume;

pub use contact::{ContactClient, ContactError, ContactOutcome};
pub use projects::{ProjectList, ProjectsClient, ProjectsError};
pub use resume::{ResumeClient, ResumeError};

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::SiteConfig;

/// Builds the HTTP client shared by all API clients
///
/// Applies the configured request timeout, if any.
pub fn http_client(config: &SiteConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")));
    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
}

/// A project shown in the portfolio showcase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Identifier; the API uses numbers or strings
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "projectName")]
    pub project_name: String,
    #[serde(default, alias = "desc")]
    pub description: String,
    /// Free-form date label, e.g. "2024" or "Mar 2024"
    #[serde(default, alias = "projectDate")]
    pub date: String,
    #[serde(rename = "imgUrl", default)]
    pub img_url: Option<String>,
    /// Technology tags; blank entries are dropped
    #[serde(default, deserialize_with = "non_empty_tags")]
    pub tags: Vec<String>,
}

/// A message submitted through the contact form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

fn non_empty_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    Ok(tags
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter(|tag| !tag.trim().is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_wire_names() {
        let project: Project = serde_json::from_str(
            r#"{
                "id": 7,
                "projectName": "Tiles",
                "description": "Grid of projects",
                "date": "2024",
                "imgUrl": "https://s3/t.png",
                "tags": ["Rust", null, " "]
            }"#,
        )
        .expect("Failed to parse Project");

        assert_eq!(project.id, "7");
        assert_eq!(project.project_name, "Tiles");
        assert_eq!(project.description, "Grid of projects");
        assert_eq!(project.date, "2024");
        assert_eq!(project.img_url.as_deref(), Some("https://s3/t.png"));
        assert_eq!(project.tags, vec!["Rust"]);
    }

    #[test]
    fn test_project_short_aliases() {
        let project: Project = serde_json::from_str(
            r#"{"id": "x", "projectName": "Short", "desc": "d", "projectDate": "2020", "tags": null}"#,
        )
        .unwrap();

        assert_eq!(project.description, "d");
        assert_eq!(project.date, "2020");
        assert!(project.img_url.is_none());
        assert!(project.tags.is_empty());
    }

    #[test]
    fn test_project_survives_cache_serialization() {
        let project = Project {
            id: "1".to_string(),
            project_name: "Cached".to_string(),
            description: "desc".to_string(),
            date: "2022".to_string(),
            img_url: None,
            tags: vec!["AWS".to_string()],
        };

        let json = serde_json::to_string(&project).unwrap();
        let back: Project = serde_json::from_str(&json).unwrap();

        assert_eq!(back, project);
    }

    #[test]
    fn test_http_client_builds_with_timeout() {
        let config = SiteConfig {
            request_timeout_secs: Some(5),
            ..Default::default()
        };
        assert!(http_client(&config).is_ok());
    }
}
