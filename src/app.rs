//! Application wiring for folio
//!
//! `App` builds the API clients, the resume cache and the resolver from a
//! `SiteConfig`, and runs each command against them.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::warn;

use crate::cache::{CacheManager, MemoryStore, ResumeCache, StoredResumeCache};
use crate::cli::CacheAction;
use crate::config::{ConfigError, SiteConfig};
use crate::data::projects::CACHE_KEY as PROJECTS_CACHE_KEY;
use crate::data::{
    http_client, ContactClient, ContactError, ContactMessage, ProjectsClient, ProjectsError,
    ResumeClient,
};
use crate::resolver::ResumeResolver;
use crate::ui;

/// Errors that end a command unsuccessfully
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Projects(#[from] ProjectsError),

    #[error(transparent)]
    Contact(#[from] ContactError),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to clear cache: {0}")]
    CacheIo(#[from] std::io::Error),

    /// The resume link could not be resolved and no fallback exists
    #[error("{0}")]
    ResumeUnavailable(String),
}

/// Main application struct holding the configured clients
pub struct App {
    config: SiteConfig,
    cache_manager: Option<CacheManager>,
    resume_cache: Arc<dyn ResumeCache>,
    resolver: ResumeResolver,
    projects_client: ProjectsClient,
    contact_client: ContactClient,
}

impl App {
    /// Creates an App using the XDG cache directory
    pub fn new(config: SiteConfig) -> Result<Self, AppError> {
        Self::with_cache_manager(config, CacheManager::new())
    }

    /// Creates an App with a specific cache location, or none
    ///
    /// Without a cache directory the resume link is cached in memory only.
    pub fn with_cache_manager(
        config: SiteConfig,
        cache_manager: Option<CacheManager>,
    ) -> Result<Self, AppError> {
        let http = http_client(&config)?;

        let resume_cache: Arc<dyn ResumeCache> = match cache_manager {
            Some(ref manager) => Arc::new(StoredResumeCache::new(
                manager.clone(),
                config.cache_duration(),
            )),
            None => {
                warn!("No cache directory available, resume link will not persist");
                Arc::new(StoredResumeCache::new(
                    MemoryStore::new(),
                    config.cache_duration(),
                ))
            }
        };

        let resolver = ResumeResolver::new(
            ResumeClient::with_client(http.clone(), config.resume_endpoint()?),
            resume_cache.clone(),
        );

        let mut projects_client =
            ProjectsClient::with_client(http.clone(), config.projects_endpoint()?);
        if let Some(ref manager) = cache_manager {
            projects_client =
                projects_client.with_cache(manager.clone(), config.projects_cache_duration());
        }

        let contact_client = ContactClient::with_client(http, config.contact_endpoint()?);

        Ok(Self {
            config,
            cache_manager,
            resume_cache,
            resolver,
            projects_client,
            contact_client,
        })
    }

    pub fn resolver(&self) -> &ResumeResolver {
        &self.resolver
    }

    /// Resolves the resume link and renders it
    ///
    /// Fails only when there is no link at all to show.
    pub async fn resume(&self, json: bool) -> Result<String, AppError> {
        let state = self.resolver.resolve().await;
        let text = if json {
            serde_json::to_string_pretty(&state)?
        } else {
            ui::render_resume(&state)
        };
        if state.url.is_none() && state.error.is_some() && !json {
            return Err(AppError::ResumeUnavailable(text));
        }
        Ok(text)
    }

    /// Fetches and renders the project list
    pub async fn projects(&self, json: bool, refresh: bool) -> Result<String, AppError> {
        let list = self.projects_client.fetch_projects(refresh).await?;
        if json {
            Ok(serde_json::to_string_pretty(&list.projects)?)
        } else {
            Ok(ui::render_projects(&list))
        }
    }

    /// Submits the contact form and renders the outcome
    pub async fn contact(&self, message: &ContactMessage) -> Result<String, AppError> {
        let outcome = self.contact_client.submit(message).await?;
        Ok(ui::render_contact(outcome, &self.config.alternate_contact))
    }

    /// Shows or clears cached data
    pub fn cache(&self, action: CacheAction) -> Result<String, AppError> {
        match action {
            CacheAction::Show => Ok(ui::render_cache_entry(
                self.resume_cache.entry().as_ref(),
                Utc::now(),
            )),
            CacheAction::Clear => {
                self.resume_cache.clear();
                if let Some(ref manager) = self.cache_manager {
                    manager.remove(PROJECTS_CACHE_KEY)?;
                }
                Ok("Cache cleared.".to_string())
            }
        }
    }
}
