//! # Avatar Acquisition
//!
//! Walks an ordered list of avatar source templates and returns the first
//! response that looks like a real image, normalized.
//!
//! ## Acceptance rules
//!
//! A source response is accepted only when:
//! - the status is 2xx
//! - the body is at least `min_payload_bytes` long (error pages and 1×1
//!   tracking pixels are often served with 200)
//! - the `Content-Type`, when present and the guard is enabled, is `image/*`
//! - the body decodes as an image
//!
//! Every source is tried exactly once. A rejected source is logged and the
//! next one is tried; running out of sources yields `None`.

use crate::error::{MetadataError, Result};
use crate::normalizer::ImageNormalizer;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use core_library::models::{CreatorIdentifier, NormalizedArtifact};
use core_runtime::config::{AvatarConfig, USERNAME_PLACEHOLDER};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub struct AvatarAcquirer {
    http_client: Arc<dyn HttpClient>,
    normalizer: ImageNormalizer,
    source_templates: Vec<String>,
    min_payload_bytes: usize,
    fetch_timeout: Duration,
    require_image_content_type: bool,
}

impl AvatarAcquirer {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &AvatarConfig) -> Self {
        Self {
            http_client,
            normalizer: ImageNormalizer::from_config(config),
            source_templates: config.source_templates.clone(),
            min_payload_bytes: config.min_payload_bytes,
            fetch_timeout: config.fetch_timeout,
            require_image_content_type: config.require_image_content_type,
        }
    }

    /// Acquire an avatar for a raw username.
    ///
    /// A blank username is a skip signal: `None` without any request.
    pub async fn acquire(&self, username: &str) -> Option<NormalizedArtifact> {
        match CreatorIdentifier::parse(username) {
            Some(identifier) => self.acquire_for(&identifier).await,
            None => {
                debug!("Blank username, nothing to acquire");
                None
            }
        }
    }

    /// Acquire an avatar for an already normalized identifier
    #[instrument(skip_all, fields(username = %identifier))]
    pub async fn acquire_for(&self, identifier: &CreatorIdentifier) -> Option<NormalizedArtifact> {
        for (index, template) in self.source_templates.iter().enumerate() {
            let url = source_url(template, identifier);

            match self.try_source(&url).await {
                Ok(artifact) => {
                    debug!(source = index + 1, %url, size = artifact.len(), "Avatar acquired");
                    return Some(artifact);
                }
                Err(error) => {
                    warn!(source = index + 1, %url, %error, "Avatar source rejected");
                }
            }
        }

        warn!(sources = self.source_templates.len(), "All avatar sources exhausted");
        None
    }

    /// Fetch one source and normalize it, or explain why it was rejected
    async fn try_source(&self, url: &str) -> Result<NormalizedArtifact> {
        let request = HttpRequest::new(HttpMethod::Get, url)
            .header("Accept", "image/*")
            .timeout(self.fetch_timeout);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|source| MetadataError::Fetch {
                url: url.to_string(),
                source,
            })?;

        if !response.is_success() {
            return Err(MetadataError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        if response.body.len() < self.min_payload_bytes {
            return Err(MetadataError::ImplausiblePayload {
                url: url.to_string(),
                size: response.body.len(),
                min: self.min_payload_bytes,
            });
        }

        if self.require_image_content_type {
            if let Some(content_type) = response.header("content-type") {
                if !content_type.trim().to_ascii_lowercase().starts_with("image/") {
                    return Err(MetadataError::UnexpectedContentType {
                        url: url.to_string(),
                        content_type: content_type.to_string(),
                    });
                }
            }
        }

        self.normalizer.normalize(&response.body)
    }
}

/// Interpolate the URL-encoded bare username into a template
fn source_url(template: &str, identifier: &CreatorIdentifier) -> String {
    template.replace(
        USERNAME_PLACEHOLDER,
        &urlencoding::encode(identifier.bare()),
    )
}
