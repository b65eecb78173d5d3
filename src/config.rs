//! Site configuration
//!
//! All endpoint paths, the resume object name and cache durations live in a
//! single `SiteConfig`, loaded from `~/.config/folio/config.toml` (or a path
//! given on the command line). Missing fields fall back to the defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default base URL of the portfolio API
const DEFAULT_API_BASE_URL: &str =
    "https://yhrh5asyof.execute-api.ap-southeast-2.amazonaws.com/prod";

/// Default resume object name served by the files endpoint
const DEFAULT_RESUME_FILE: &str = "resume.pdf";

/// Presigned URLs are valid for 60 minutes; stay safely under that
const DEFAULT_CACHE_DURATION_MINUTES: u64 = 50;

/// How long a fetched project list is considered fresh
const DEFAULT_PROJECTS_CACHE_MINUTES: u64 = 60;

/// Longest cache lifetime accepted for either cache (one year)
const MAX_CACHE_MINUTES: u64 = 365 * 24 * 60;

/// Where to send visitors when the contact form is unavailable
const DEFAULT_ALTERNATE_CONTACT: &str = "LinkedIn (https://linkedin.com/in/anyangateny1)";

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for `SiteConfig`
    #[error("Invalid config {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    /// The API base URL cannot be parsed
    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    /// A field holds a value that can never work
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Paths of the API endpoints, relative to the base URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub projects: String,
    pub contact: String,
    /// Prefix for file lookups; the file name is appended as a path segment
    pub files: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            projects: "/api/projects".to_string(),
            contact: "/api/contact".to_string(),
            files: "/api/files".to_string(),
        }
    }
}

/// Configuration for talking to the portfolio API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL of the API, e.g. `https://api.example.com/prod`
    pub api_base_url: String,
    /// Name of the resume object behind the files endpoint
    pub resume_file: String,
    /// Lifetime of a cached presigned resume URL
    pub cache_duration_minutes: u64,
    /// Lifetime of a cached project list
    pub projects_cache_minutes: u64,
    /// Optional HTTP timeout; the transport default applies when unset
    pub request_timeout_secs: Option<u64>,
    /// Contact channel suggested when the contact form cannot deliver
    pub alternate_contact: String,
    pub endpoints: Endpoints,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            resume_file: DEFAULT_RESUME_FILE.to_string(),
            cache_duration_minutes: DEFAULT_CACHE_DURATION_MINUTES,
            projects_cache_minutes: DEFAULT_PROJECTS_CACHE_MINUTES,
            request_timeout_secs: None,
            alternate_contact: DEFAULT_ALTERNATE_CONTACT.to_string(),
            endpoints: Endpoints::default(),
        }
    }
}

impl SiteConfig {
    /// Returns the default config file location (`<config_dir>/folio/config.toml`)
    ///
    /// Returns `None` if no home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "folio")?;
        Some(project_dirs.config_dir().join("config.toml"))
    }

    /// Loads and validates configuration from the given path, or the default path.
    ///
    /// An explicitly given path must exist. A missing file at the default
    /// location yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = Self::load_unvalidated(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Same as `load`, but leaves validation to the caller so overrides can
    /// be applied first
    pub fn load_unvalidated(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        Ok(config)
    }

    /// Parses a config file without validating it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml(&content).map_err(|reason| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parses configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Checks that the configuration can actually be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.resume_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "resume_file",
                reason: "must not be empty".to_string(),
            });
        }
        check_cache_minutes("cache_duration_minutes", self.cache_duration_minutes)?;
        check_cache_minutes("projects_cache_minutes", self.projects_cache_minutes)?;
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Lifetime of a cached resume URL, capped at one year
    pub fn cache_duration(&self) -> Duration {
        cache_minutes(self.cache_duration_minutes)
    }

    /// Lifetime of a cached project list, capped at one year
    pub fn projects_cache_duration(&self) -> Duration {
        cache_minutes(self.projects_cache_minutes)
    }

    /// Full URL of the presigned-URL lookup for the resume
    pub fn resume_endpoint(&self) -> Result<Url, ConfigError> {
        let mut segments = path_segments(&self.endpoints.files);
        segments.push(self.resume_file.as_str());
        self.join(&segments)
    }

    /// Full URL of the projects endpoint
    pub fn projects_endpoint(&self) -> Result<Url, ConfigError> {
        self.join(&path_segments(&self.endpoints.projects))
    }

    /// Full URL of the contact endpoint
    pub fn contact_endpoint(&self) -> Result<Url, ConfigError> {
        self.join(&path_segments(&self.endpoints.contact))
    }

    fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.api_base_url)
            .map_err(|_| ConfigError::InvalidBaseUrl(self.api_base_url.clone()))?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl(self.api_base_url.clone()));
        }
        Ok(url)
    }

    /// Appends path segments to the base URL, percent-encoding each one
    fn join(&self, segments: &[&str]) -> Result<Url, ConfigError> {
        let mut url = self.base_url()?;
        url.path_segments_mut()
            .map_err(|_| ConfigError::InvalidBaseUrl(self.api_base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn check_cache_minutes(field: &'static str, minutes: u64) -> Result<(), ConfigError> {
    if minutes == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be greater than zero".to_string(),
        });
    }
    if minutes > MAX_CACHE_MINUTES {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be at most {} (one year)", MAX_CACHE_MINUTES),
        });
    }
    Ok(())
}

fn cache_minutes(minutes: u64) -> Duration {
    let max = Duration::minutes(MAX_CACHE_MINUTES as i64);
    i64::try_from(minutes)
        .ok()
        .and_then(Duration::try_minutes)
        .map_or(max, |duration| duration.min(max))
}

fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
