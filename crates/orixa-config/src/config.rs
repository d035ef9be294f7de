// crates/orixa-config/src/config.rs
// ============================================================================
// Module: Orixa Configuration
// Description: Configuration loading and validation for Orixa.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: orixa-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional; an empty file yields the defaults. Invalid
//! values fail closed with [`ConfigError::Invalid`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use orixa_core::AuditSink;
use orixa_core::Catalogs;
use orixa_core::EngineHooks;
use orixa_core::FileAuditSink;
use orixa_core::LadderSettings;
use orixa_core::NoopAuditSink;
use orixa_core::StderrAuditSink;
use orixa_core::SystemClock;
use orixa_core::runtime::ladder::DEFAULT_STAGE_NAMES;
use orixa_core::runtime::ladder::MIN_STAGES;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::builtin_catalogs;
use crate::catalog::load_catalogs;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "orixa.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "ORIXA_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a stage name.
pub(crate) const MAX_STAGE_NAME_LENGTH: usize = 128;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Orixa configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrixaConfig {
    /// Audit trail configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Adoption ladder defaults.
    #[serde(default)]
    pub ladder: LadderConfig,
    /// Catalog source configuration.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl OrixaConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is the explicit `path`, else `ORIXA_CONFIG`, else
    /// `orixa.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.audit.validate()?;
        self.ladder.validate()?;
        self.catalog.validate()?;
        Ok(())
    }

    /// Resolves the catalogs: the configured file, or the built-in set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the catalog cannot be read or is invalid.
    pub fn catalogs(&self) -> Result<Catalogs, ConfigError> {
        match &self.catalog.path {
            Some(path) => load_catalogs(Path::new(path.trim())),
            None => builtin_catalogs(),
        }
    }

    /// Builds engine hooks with the configured audit sink and the system
    /// clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn hooks(&self) -> Result<EngineHooks, ConfigError> {
        Ok(EngineHooks::new(self.audit.sink()?, Arc::new(SystemClock)))
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard audit events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
}

/// Audit trail configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink selection.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (JSON lines); required for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (&self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.sink=file requires audit.path".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid with audit.sink=file".to_string()))
            }
            (_, None) => Ok(()),
        }
    }

    /// Opens the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file sink cannot be opened.
    pub fn sink(&self) -> Result<Arc<dyn AuditSink>, ConfigError> {
        match self.sink {
            AuditSinkKind::None => Ok(Arc::new(NoopAuditSink)),
            AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
            AuditSinkKind::File => {
                let path = self
                    .path
                    .as_deref()
                    .ok_or_else(|| ConfigError::Invalid("audit.sink=file requires audit.path".to_string()))?;
                let sink = FileAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(format!("audit.path: {err}")))?;
                Ok(Arc::new(sink))
            }
        }
    }
}

/// Adoption ladder defaults for new workspaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LadderConfig {
    /// Default stage names in order.
    #[serde(default = "default_stage_names")]
    pub stages: Vec<String>,
    /// Offer earlier stages as exit targets.
    #[serde(default = "default_allow_backward")]
    pub allow_backward: bool,
    /// Configure one ladder per product.
    #[serde(default)]
    pub per_product: bool,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            stages: default_stage_names(),
            allow_backward: default_allow_backward(),
            per_product: false,
        }
    }
}

impl LadderConfig {
    /// Validates the stage list.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.stages.len() < MIN_STAGES {
            return Err(ConfigError::Invalid(format!("ladder.stages must list at least {MIN_STAGES} stages")));
        }
        let mut seen = BTreeSet::new();
        for name in &self.stages {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Invalid("ladder.stages entries must be non-empty".to_string()));
            }
            if trimmed.len() > MAX_STAGE_NAME_LENGTH {
                return Err(ConfigError::Invalid(format!("ladder.stages entry too long: {trimmed}")));
            }
            if !seen.insert(trimmed) {
                return Err(ConfigError::Invalid(format!("ladder.stages contains duplicate: {trimmed}")));
            }
        }
        Ok(())
    }

    /// Ladder settings seeded from this configuration.
    #[must_use]
    pub fn settings(&self) -> LadderSettings {
        LadderSettings {
            per_product: self.per_product,
            allow_backward: self.allow_backward,
            ..LadderSettings::default()
        }
    }
}

/// Catalog source configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Optional catalog TOML replacing the built-in catalogs.
    #[serde(default)]
    pub path: Option<String>,
}

impl CatalogConfig {
    /// Validates the catalog path.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("catalog.path", path)?;
        }
        Ok(())
    }
}

/// Default stage names.
fn default_stage_names() -> Vec<String> {
    DEFAULT_STAGE_NAMES.iter().map(|name| (*name).to_string()).collect()
}

/// Default for `ladder.allow_backward`.
const fn default_allow_backward() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a resolved path against length limits.
pub(crate) fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
