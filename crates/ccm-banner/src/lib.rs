#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Banner markup rendering.
//!
//! The banner-read endpoint captures whatever the renderer produces as a
//! string; emptiness policy (404 on blank output) lives with the endpoint,
//! not here.

use std::fs;
use std::path::PathBuf;

use ccm_config::Settings;
use thiserror::Error;
use tracing::debug;

/// Error type for banner rendering.
#[derive(Debug, Error)]
pub enum BannerError {
    /// Custom template file could not be read.
    #[error("failed to read banner template")]
    TemplateRead {
        /// Path of the template file.
        path: PathBuf,
        /// Source IO error.
        source: std::io::Error,
    },
}

/// Produces the banner's HTML from a settings snapshot.
pub trait BannerRenderer: Send + Sync {
    /// Render the banner markup.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured template cannot be read.
    fn render(&self, settings: &Settings) -> Result<String, BannerError>;
}

/// Default renderer: a custom on-disk template when configured, built-in
/// markup otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    fn render_builtin(settings: &Settings) -> String {
        let banner = &settings.banner;
        if banner.message.trim().is_empty() {
            return String::new();
        }
        let mut html = String::new();
        html.push_str(&format!(
            "<div class=\"ccm-banner\" role=\"dialog\" aria-label=\"{}\">\n",
            banner.heading
        ));
        html.push_str(&format!(
            "  <p class=\"ccm-banner__heading\">{}</p>\n",
            banner.heading
        ));
        html.push_str(&format!(
            "  <p class=\"ccm-banner__message\">{}</p>\n",
            banner.message
        ));
        html.push_str(&format!(
            "  <button class=\"ccm-banner__accept\">{}</button>\n",
            banner.accept_label
        ));
        html.push_str(&format!(
            "  <button class=\"ccm-banner__settings\">{}</button>\n",
            banner.settings_label
        ));
        html.push_str("</div>\n");
        html
    }

    fn render_template(raw: &str, settings: &Settings) -> String {
        let banner = &settings.banner;
        raw.replace("{{heading}}", &banner.heading)
            .replace("{{message}}", &banner.message)
            .replace("{{accept_label}}", &banner.accept_label)
            .replace("{{settings_label}}", &banner.settings_label)
    }
}

impl BannerRenderer for TemplateRenderer {
    fn render(&self, settings: &Settings) -> Result<String, BannerError> {
        if let Some(path) = &settings.banner.template_path {
            let raw = fs::read_to_string(path).map_err(|source| BannerError::TemplateRead {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "rendering banner from custom template");
            return Ok(Self::render_template(&raw, settings));
        }
        Ok(Self::render_builtin(settings))
    }
}
