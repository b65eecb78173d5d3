//! Text rendering for folio
//!
//! Turns resolver state, project lists and contact outcomes into the lines
//! printed by the command-line front end.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::cache::CachedResumeUrl;
use crate::data::{ContactOutcome, Project, ProjectList};
use crate::resolver::{ResolutionPhase, ResolutionState};

/// Renders the resume button: the link, a degraded link with a warning, or nothing
pub fn render_resume(state: &ResolutionState) -> String {
    let error = state.error.as_deref().unwrap_or_default();
    match (state.phase(), state.url.as_deref()) {
        (ResolutionPhase::Loading, _) => "Loading resume...".to_string(),
        (ResolutionPhase::Resolved, Some(url)) => format!("Resume: {}", url),
        (ResolutionPhase::FailedWithFallback, Some(url)) => format!(
            "Resume: {}\nWarning: {} (showing a previously cached link)",
            url, error
        ),
        (ResolutionPhase::FailedEmpty, _) => format!("Resume unavailable: {}", error),
        _ => "Resume unavailable".to_string(),
    }
}

/// Renders the project showcase as an indented list, in API order
pub fn render_projects(list: &ProjectList) -> String {
    if list.projects.is_empty() {
        return "No projects found.".to_string();
    }

    let mut out = String::new();
    if list.is_stale {
        out.push_str("Warning: projects API unavailable, showing cached projects\n\n");
    }
    for (i, project) in list.projects.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_project(&mut out, project);
    }
    out.trim_end().to_string()
}

fn render_project(out: &mut String, project: &Project) {
    if project.date.is_empty() {
        let _ = writeln!(out, "{}", project.project_name);
    } else {
        let _ = writeln!(out, "{} ({})", project.project_name, project.date);
    }
    if !project.description.is_empty() {
        let _ = writeln!(out, "  {}", project.description);
    }
    if !project.tags.is_empty() {
        let _ = writeln!(out, "  Tags: {}", project.tags.join(", "));
    }
    if let Some(ref img) = project.img_url {
        let _ = writeln!(out, "  Image: {}", img);
    }
}

/// Renders the contact form result; an unverified sender points to another channel
pub fn render_contact(outcome: ContactOutcome, alternate_contact: &str) -> String {
    match outcome {
        ContactOutcome::Sent => {
            "Message sent! Thank you for your message. I'll get back to you soon.".to_string()
        }
        ContactOutcome::SenderUnverified => format!(
            "Contact form temporarily unavailable. Please reach out directly via {}",
            alternate_contact
        ),
    }
}

/// Renders the stored resume link entry for `folio cache show`
pub fn render_cache_entry(entry: Option<&CachedResumeUrl>, now: DateTime<Utc>) -> String {
    match entry {
        None => "No cached resume link.".to_string(),
        Some(entry) if entry.is_valid_at(now) => {
            let left = entry.expires_at - now;
            format!(
                "Cached resume link: {}\nExpires: {} ({} min left)",
                entry.url,
                entry.expires_at.to_rfc3339(),
                left.num_minutes()
            )
        }
        Some(entry) => format!(
            "Cached resume link: {}\nExpired: {}",
            entry.url,
            entry.expires_at.to_rfc3339()
        ),
    }
}
