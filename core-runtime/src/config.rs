//! # Core Configuration Module
//!
//! Provides configuration management for the avatar sync pipeline.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`SyncConfig`]. Values are layered, each layer only overriding what it
//! actually sets:
//!
//! 1. Built-in defaults
//! 2. An optional TOML settings file ([`SettingsFile`])
//! 3. Environment variables ([`SyncConfigBuilder::apply_env`])
//! 4. Explicit builder calls (the CLI flags)
//!
//! `build()` fails fast when the storage endpoint or the service-role key is
//! missing, and validates the tunables of the avatar pipeline.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{SettingsFile, SyncConfig};
//!
//! let settings = SettingsFile::load("avatar-sync.toml")?;
//! let config = SyncConfig::builder()
//!     .apply_settings(settings)
//!     .apply_env(|key| std::env::var(key).ok())
//!     .bucket("creator-avatars")
//!     .build()?;
//! ```
//!
//! ## Environment
//!
//! | Variable                    | Meaning                                  |
//! |-----------------------------|------------------------------------------|
//! | `SUPABASE_URL`              | Storage/record endpoint (required)       |
//! | `VITE_SUPABASE_URL`         | Fallback name for the endpoint           |
//! | `SUPABASE_SERVICE_ROLE_KEY` | Service-role credential (required)       |
//! | `AVATAR_SYNC_BUCKET`        | Bucket name                              |
//! | `AVATAR_SYNC_PACING_MS`     | Delay between creators, in milliseconds  |

use crate::error::{Error, Result};
use crate::logging::redact_if_sensitive;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Placeholder substituted with the normalized username in source templates
pub const USERNAME_PLACEHOLDER: &str = "{username}";

/// Ordered avatar sources: identity lookup first, static placeholder last
pub const DEFAULT_SOURCE_TEMPLATES: &[&str] = &[
    "https://unavatar.io/tiktok/{username}",
    "https://avatars.githubusercontent.com/u/0?s=200",
];

pub const DEFAULT_BUCKET: &str = "creator-avatars";
pub const DEFAULT_FILE_SIZE_LIMIT: u64 = 5 * 1024 * 1024;
pub const DEFAULT_CANONICAL_SIZE: u32 = 200;
pub const DEFAULT_JPEG_QUALITY: u8 = 90;
pub const DEFAULT_MIN_PAYLOAD_BYTES: usize = 1000;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_INPUT_COLUMN: &str = "Creator's username";

const ENV_ENDPOINT: &str = "SUPABASE_URL";
const ENV_ENDPOINT_FALLBACK: &str = "VITE_SUPABASE_URL";
const ENV_SERVICE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
const ENV_BUCKET: &str = "AVATAR_SYNC_BUCKET";
const ENV_PACING_MS: &str = "AVATAR_SYNC_PACING_MS";

/// Largest canonical edge accepted by validation
const MAX_CANONICAL_SIZE: u32 = 4096;

/// Complete configuration for one sync run.
///
/// Use [`SyncConfigBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    pub storage: StorageConfig,
    pub records: RecordConfig,
    pub avatar: AvatarConfig,
    /// Courtesy delay inserted after each creator that hit the network
    pub pacing_delay: Duration,
    /// Input column holding the creator username
    pub input_column: String,
}

/// Object storage settings
#[derive(Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Base URL of the storage/record backend
    pub endpoint: String,
    /// Service-role credential; never logged
    pub service_key: String,
    pub bucket: String,
    /// Bucket visibility used when the bucket has to be created
    pub public: bool,
    /// Object size limit used when the bucket has to be created
    pub file_size_limit: u64,
    /// Accepted MIME types used when the bucket has to be created
    pub allowed_mime_types: Vec<String>,
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field(
                "service_key",
                &redact_if_sensitive("service_key", &self.service_key),
            )
            .field("bucket", &self.bucket)
            .field("public", &self.public)
            .field("file_size_limit", &self.file_size_limit)
            .field("allowed_mime_types", &self.allowed_mime_types)
            .finish()
    }
}

/// Creator table layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordConfig {
    pub table: String,
    /// Column holding the (bare or `@`-prefixed) username
    pub username_column: String,
    /// Column receiving the public avatar URL
    pub reference_column: String,
    /// Column receiving the ISO-8601 refresh timestamp
    pub refreshed_at_column: String,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            table: "creators".to_string(),
            username_column: "tiktok_username".to_string(),
            reference_column: "profile_image_url".to_string(),
            refreshed_at_column: "profile_image_last_refreshed".to_string(),
        }
    }
}

/// Avatar acquisition and normalization settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarConfig {
    /// Ordered URL templates; `{username}` is replaced per creator
    pub source_templates: Vec<String>,
    /// Edge length of the square output image, in pixels
    pub canonical_size: u32,
    /// JPEG quality factor (1-100)
    pub jpeg_quality: u8,
    /// Smallest payload accepted from a source, in bytes
    pub min_payload_bytes: usize,
    /// Timeout for a single source fetch
    pub fetch_timeout: Duration,
    /// Reject responses whose Content-Type is present and not `image/*`
    pub require_image_content_type: bool,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            source_templates: DEFAULT_SOURCE_TEMPLATES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            canonical_size: DEFAULT_CANONICAL_SIZE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            min_payload_bytes: DEFAULT_MIN_PAYLOAD_BYTES,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            require_image_content_type: false,
        }
    }
}

impl AvatarConfig {
    /// Validates the avatar tunables
    pub fn validate(&self) -> Result<()> {
        if self.source_templates.is_empty() {
            return Err(Error::Config(
                "At least one avatar source template is required".to_string(),
            ));
        }

        for template in &self.source_templates {
            if !(template.starts_with("https://") || template.starts_with("http://")) {
                return Err(Error::Config(format!(
                    "Avatar source template must be an http(s) URL: '{}'",
                    template
                )));
            }
        }

        if self.canonical_size == 0 || self.canonical_size > MAX_CANONICAL_SIZE {
            return Err(Error::Config(format!(
                "Canonical size must be between 1 and {} pixels, got {}",
                MAX_CANONICAL_SIZE, self.canonical_size
            )));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::Config(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }

        if self.fetch_timeout.is_zero() {
            return Err(Error::Config(
                "Fetch timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl SyncConfig {
    /// Creates a new builder for constructing a `SyncConfig`.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.endpoint.trim().is_empty() {
            return Err(endpoint_missing_error());
        }

        if !(self.storage.endpoint.starts_with("https://")
            || self.storage.endpoint.starts_with("http://"))
        {
            return Err(Error::Config(format!(
                "Storage endpoint must be an http(s) URL: '{}'",
                self.storage.endpoint
            )));
        }

        if self.storage.service_key.trim().is_empty() {
            return Err(service_key_missing_error());
        }

        if self.storage.bucket.trim().is_empty() {
            return Err(Error::Config("Bucket name cannot be empty".to_string()));
        }

        if self.records.table.trim().is_empty() || self.records.username_column.trim().is_empty()
        {
            return Err(Error::Config(
                "Record table and username column cannot be empty".to_string(),
            ));
        }

        if self.input_column.trim().is_empty() {
            return Err(Error::Config("Input column cannot be empty".to_string()));
        }

        self.avatar.validate()
    }
}

fn endpoint_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "StorageEndpoint".to_string(),
        message: format!(
            "No storage endpoint configured. Set {} (or {}) or `endpoint` under [storage] in the settings file.",
            ENV_ENDPOINT, ENV_ENDPOINT_FALLBACK
        ),
    }
}

fn service_key_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "StorageCredential".to_string(),
        message: format!(
            "No service-role key configured. Set {} in the environment.",
            ENV_SERVICE_KEY
        ),
    }
}

/// Optional TOML settings file.
///
/// Every field is optional; absent fields keep the value of the lower layer.
/// Credentials are not accepted here.
///
/// ```toml
/// [storage]
/// bucket = "creator-avatars"
///
/// [avatar]
/// source_templates = ["https://unavatar.io/tiktok/{username}"]
/// canonical_size = 200
///
/// [pipeline]
/// pacing_ms = 500
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub records: RecordSettings,
    #[serde(default)]
    pub avatar: AvatarSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StorageSettings {
    pub endpoint: Option<String>,
    pub bucket: Option<String>,
    pub public: Option<bool>,
    pub file_size_limit: Option<u64>,
    pub allowed_mime_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RecordSettings {
    pub table: Option<String>,
    pub username_column: Option<String>,
    pub reference_column: Option<String>,
    pub refreshed_at_column: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AvatarSettings {
    pub source_templates: Option<Vec<String>>,
    pub canonical_size: Option<u32>,
    pub jpeg_quality: Option<u8>,
    pub min_payload_bytes: Option<usize>,
    pub fetch_timeout_secs: Option<u64>,
    pub require_image_content_type: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PipelineSettings {
    pub pacing_ms: Option<u64>,
    pub input_column: Option<String>,
}

impl SettingsFile {
    /// Parses settings from TOML text
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Invalid settings file: {}", e)))
    }

    /// Reads and parses a settings file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&text)
    }
}

/// Builder for constructing [`SyncConfig`] instances.
#[derive(Default, Clone)]
pub struct SyncConfigBuilder {
    endpoint: Option<String>,
    service_key: Option<String>,
    bucket: Option<String>,
    public: Option<bool>,
    file_size_limit: Option<u64>,
    allowed_mime_types: Option<Vec<String>>,
    records: RecordConfig,
    source_templates: Option<Vec<String>>,
    canonical_size: Option<u32>,
    jpeg_quality: Option<u8>,
    min_payload_bytes: Option<usize>,
    fetch_timeout: Option<Duration>,
    require_image_content_type: Option<bool>,
    pacing_delay: Option<Duration>,
    /// Raw `AVATAR_SYNC_PACING_MS` value that did not parse
    invalid_pacing: Option<String>,
    input_column: Option<String>,
}

impl fmt::Debug for SyncConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfigBuilder")
            .field("endpoint", &self.endpoint)
            .field(
                "service_key",
                &self
                    .service_key
                    .as_deref()
                    .map(|key| redact_if_sensitive("service_key", key)),
            )
            .field("bucket", &self.bucket)
            .field("public", &self.public)
            .field("file_size_limit", &self.file_size_limit)
            .field("allowed_mime_types", &self.allowed_mime_types)
            .field("records", &self.records)
            .field("source_templates", &self.source_templates)
            .field("canonical_size", &self.canonical_size)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("min_payload_bytes", &self.min_payload_bytes)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("require_image_content_type", &self.require_image_content_type)
            .field("pacing_delay", &self.pacing_delay)
            .field("invalid_pacing", &self.invalid_pacing)
            .field("input_column", &self.input_column)
            .finish()
    }
}

impl SyncConfigBuilder {
    /// Overlays every value present in a settings file.
    pub fn apply_settings(mut self, settings: SettingsFile) -> Self {
        let SettingsFile {
            storage,
            records,
            avatar,
            pipeline,
        } = settings;

        self.endpoint = storage.endpoint.or(self.endpoint);
        self.bucket = storage.bucket.or(self.bucket);
        self.public = storage.public.or(self.public);
        self.file_size_limit = storage.file_size_limit.or(self.file_size_limit);
        self.allowed_mime_types = storage.allowed_mime_types.or(self.allowed_mime_types);

        if let Some(table) = records.table {
            self.records.table = table;
        }
        if let Some(column) = records.username_column {
            self.records.username_column = column;
        }
        if let Some(column) = records.reference_column {
            self.records.reference_column = column;
        }
        if let Some(column) = records.refreshed_at_column {
            self.records.refreshed_at_column = column;
        }

        self.source_templates = avatar.source_templates.or(self.source_templates);
        self.canonical_size = avatar.canonical_size.or(self.canonical_size);
        self.jpeg_quality = avatar.jpeg_quality.or(self.jpeg_quality);
        self.min_payload_bytes = avatar.min_payload_bytes.or(self.min_payload_bytes);
        self.fetch_timeout = avatar
            .fetch_timeout_secs
            .map(Duration::from_secs)
            .or(self.fetch_timeout);
        self.require_image_content_type = avatar
            .require_image_content_type
            .or(self.require_image_content_type);

        self.pacing_delay = pipeline
            .pacing_ms
            .map(Duration::from_millis)
            .or(self.pacing_delay);
        self.input_column = pipeline.input_column.or(self.input_column);

        self
    }

    /// Overlays values found through `lookup`, usually `std::env::var`.
    ///
    /// Blank variables are treated as unset. An unparsable pacing value is
    /// reported by `build()`.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(endpoint) = read(ENV_ENDPOINT).or_else(|| read(ENV_ENDPOINT_FALLBACK)) {
            self.endpoint = Some(endpoint);
        }
        if let Some(key) = read(ENV_SERVICE_KEY) {
            self.service_key = Some(key);
        }
        if let Some(bucket) = read(ENV_BUCKET) {
            self.bucket = Some(bucket);
        }
        if let Some(pacing) = read(ENV_PACING_MS) {
            match pacing.trim().parse::<u64>() {
                Ok(ms) => {
                    self.pacing_delay = Some(Duration::from_millis(ms));
                    self.invalid_pacing = None;
                }
                Err(_) => self.invalid_pacing = Some(pacing),
            }
        }

        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn service_key(mut self, key: impl Into<String>) -> Self {
        self.service_key = Some(key.into());
        self
    }

    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    pub fn records(mut self, records: RecordConfig) -> Self {
        self.records = records;
        self
    }

    pub fn source_templates<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_templates = Some(templates.into_iter().map(Into::into).collect());
        self
    }

    pub fn canonical_size(mut self, size: u32) -> Self {
        self.canonical_size = Some(size);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = Some(quality);
        self
    }

    pub fn min_payload_bytes(mut self, bytes: usize) -> Self {
        self.min_payload_bytes = Some(bytes);
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn require_image_content_type(mut self, required: bool) -> Self {
        self.require_image_content_type = Some(required);
        self
    }

    /// Explicit delay; overrides an unparsable environment value
    pub fn pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = Some(delay);
        self.invalid_pacing = None;
        self
    }

    pub fn input_column(mut self, column: impl Into<String>) -> Self {
        self.input_column = Some(column.into());
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - `CapabilityMissing` when the endpoint or the service key is absent
    /// - `Config` when a value is out of range
    pub fn build(self) -> Result<SyncConfig> {
        let endpoint = self.endpoint.ok_or_else(endpoint_missing_error)?;
        let service_key = self.service_key.ok_or_else(service_key_missing_error)?;

        if let Some(raw) = self.invalid_pacing {
            return Err(Error::Config(format!(
                "{} must be a whole number of milliseconds, got '{}'",
                ENV_PACING_MS, raw
            )));
        }
        let pacing_delay = self.pacing_delay.unwrap_or(DEFAULT_PACING_DELAY);

        let defaults = AvatarConfig::default();
        let config = SyncConfig {
            storage: StorageConfig {
                endpoint: endpoint.trim_end_matches('/').to_string(),
                service_key,
                bucket: self.bucket.unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
                public: self.public.unwrap_or(true),
                file_size_limit: self.file_size_limit.unwrap_or(DEFAULT_FILE_SIZE_LIMIT),
                allowed_mime_types: self.allowed_mime_types.unwrap_or_else(|| {
                    vec![
                        "image/jpeg".to_string(),
                        "image/png".to_string(),
                        "image/webp".to_string(),
                    ]
                }),
            },
            records: self.records,
            avatar: AvatarConfig {
                source_templates: self.source_templates.unwrap_or(defaults.source_templates),
                canonical_size: self.canonical_size.unwrap_or(defaults.canonical_size),
                jpeg_quality: self.jpeg_quality.unwrap_or(defaults.jpeg_quality),
                min_payload_bytes: self.min_payload_bytes.unwrap_or(defaults.min_payload_bytes),
                fetch_timeout: self.fetch_timeout.unwrap_or(defaults.fetch_timeout),
                require_image_content_type: self
                    .require_image_content_type
                    .unwrap_or(defaults.require_image_content_type),
            },
            pacing_delay,
            input_column: self
                .input_column
                .unwrap_or_else(|| DEFAULT_INPUT_COLUMN.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> SyncConfigBuilder {
        SyncConfig::builder()
            .endpoint("https://project.supabase.co")
            .service_key("service-role-key")
    }

    #[test]
    fn test_defaults() {
        let config = minimal().build().unwrap();

        assert_eq!(config.storage.bucket, "creator-avatars");
        assert!(config.storage.public);
        assert_eq!(config.storage.file_size_limit, 5_242_880);
        assert_eq!(config.avatar.canonical_size, 200);
        assert_eq!(config.avatar.jpeg_quality, 90);
        assert_eq!(config.avatar.min_payload_bytes, 1000);
        assert_eq!(config.avatar.fetch_timeout, Duration::from_secs(15));
        assert_eq!(config.avatar.source_templates.len(), 2);
        assert!(config.avatar.source_templates[0].contains(USERNAME_PLACEHOLDER));
        assert_eq!(config.pacing_delay, Duration::from_millis(500));
        assert_eq!(config.records.username_column, "tiktok_username");
        assert_eq!(config.input_column, "Creator's username");
    }

    #[test]
    fn test_missing_endpoint_is_capability_error() {
        let result = SyncConfig::builder().service_key("k").build();
        match result {
            Err(Error::CapabilityMissing { capability, message }) => {
                assert_eq!(capability, "StorageEndpoint");
                assert!(message.contains("SUPABASE_URL"));
                assert!(message.contains("settings file"));
                assert!(!message.contains("--endpoint"));
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_service_key_is_capability_error() {
        let result = SyncConfig::builder()
            .endpoint("https://project.supabase.co")
            .build();
        assert!(matches!(
            result,
            Err(Error::CapabilityMissing { ref capability, .. }) if capability == "StorageCredential"
        ));
    }

    #[test]
    fn test_env_layer_and_fallback_endpoint() {
        let config = SyncConfig::builder()
            .apply_env(env(&[
                ("VITE_SUPABASE_URL", "https://fallback.supabase.co/"),
                ("SUPABASE_SERVICE_ROLE_KEY", "eyJ-secret"),
                ("AVATAR_SYNC_BUCKET", "avatars-staging"),
                ("AVATAR_SYNC_PACING_MS", "0"),
            ]))
            .build()
            .unwrap();

        assert_eq!(config.storage.endpoint, "https://fallback.supabase.co");
        assert_eq!(config.storage.service_key, "eyJ-secret");
        assert_eq!(config.storage.bucket, "avatars-staging");
        assert_eq!(config.pacing_delay, Duration::ZERO);
    }

    #[test]
    fn test_blank_env_values_are_unset() {
        let result = SyncConfig::builder()
            .apply_env(env(&[
                ("SUPABASE_URL", "  "),
                ("SUPABASE_SERVICE_ROLE_KEY", "k"),
            ]))
            .build();
        assert!(matches!(result, Err(Error::CapabilityMissing { .. })));
    }

    #[test]
    fn test_invalid_pacing_env() {
        let result = minimal()
            .apply_env(env(&[("AVATAR_SYNC_PACING_MS", "half a second")]))
            .build();
        assert!(matches!(result, Err(Error::Config(ref m)) if m.contains("AVATAR_SYNC_PACING_MS")));
    }

    #[test]
    fn test_explicit_pacing_is_not_an_env_error() {
        let config = minimal().pacing_delay(Duration::MAX).build().unwrap();
        assert_eq!(config.pacing_delay, Duration::MAX);

        let config = minimal()
            .apply_env(env(&[("AVATAR_SYNC_PACING_MS", "soon")]))
            .pacing_delay(Duration::from_millis(20))
            .build()
            .unwrap();
        assert_eq!(config.pacing_delay, Duration::from_millis(20));
    }

    #[test]
    fn test_settings_file_overlay_then_explicit_override() {
        let settings = SettingsFile::parse(
            r#"
            [storage]
            bucket = "from-file"
            file_size_limit = 1048576

            [records]
            username_column = "handle"

            [avatar]
            source_templates = ["https://a.example/{username}", "https://b.example/static.png"]
            canonical_size = 128
            jpeg_quality = 80
            fetch_timeout_secs = 5

            [pipeline]
            pacing_ms = 250
            input_column = "username"
            "#,
        )
        .unwrap();

        let config = minimal()
            .apply_settings(settings)
            .bucket("from-cli")
            .build()
            .unwrap();

        assert_eq!(config.storage.bucket, "from-cli");
        assert_eq!(config.storage.file_size_limit, 1_048_576);
        assert_eq!(config.records.username_column, "handle");
        assert_eq!(config.records.table, "creators");
        assert_eq!(config.avatar.source_templates[1], "https://b.example/static.png");
        assert_eq!(config.avatar.canonical_size, 128);
        assert_eq!(config.avatar.jpeg_quality, 80);
        assert_eq!(config.avatar.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.pacing_delay, Duration::from_millis(250));
        assert_eq!(config.input_column, "username");
    }

    #[test]
    fn test_settings_file_rejects_unknown_keys() {
        let result = SettingsFile::parse("[avatar]\nquality = 90\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_settings_file_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar-sync.toml");
        std::fs::write(&path, "[pipeline]\npacing_ms = 1000\n").unwrap();

        let settings = SettingsFile::load(&path).unwrap();
        assert_eq!(settings.pipeline.pacing_ms, Some(1000));

        let missing = SettingsFile::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(Error::Config(_))));
    }

    #[test]
    fn test_avatar_validation() {
        assert!(minimal().source_templates(Vec::<String>::new()).build().is_err());
        assert!(minimal().source_templates(["ftp://x/{username}"]).build().is_err());
        assert!(minimal().canonical_size(0).build().is_err());
        assert!(minimal().canonical_size(5000).build().is_err());
        assert!(minimal().jpeg_quality(0).build().is_err());
        assert!(minimal().jpeg_quality(101).build().is_err());
        assert!(minimal().fetch_timeout(Duration::ZERO).build().is_err());
        assert!(minimal().jpeg_quality(100).canonical_size(1).build().is_ok());
    }

    #[test]
    fn test_endpoint_must_be_http() {
        let result = SyncConfig::builder()
            .endpoint("project.supabase.co")
            .service_key("k")
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_redacts_service_key() {
        let config = minimal().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("service-role-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_builder_debug_redacts_service_key() {
        let builder = SyncConfig::builder()
            .endpoint("https://project.supabase.co")
            .service_key("super-secret-service-role");
        let debug = format!("{:?}", builder);

        assert!(!debug.contains("super-secret-service-role"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("https://project.supabase.co"));

        let env_builder = SyncConfig::builder()
            .apply_env(env(&[("SUPABASE_SERVICE_ROLE_KEY", "eyJ-env-secret")]));
        assert!(!format!("{:?}", env_builder).contains("eyJ-env-secret"));
    }
}
