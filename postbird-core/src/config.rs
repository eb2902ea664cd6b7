//! Delivery configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.postbird/
//!   config.yaml   (mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every filesystem function has two forms:
//! - `fn_at(path: &Path, …)` — explicit location; used in tests with `TempDir`
//! - `fn(…)` — derives the location from `dirs::home_dir()`, delegates to `_at`
//!
//! The pipeline itself never calls anything here. Callers load a
//! [`DeliveryConfig`], [`resolve`](DeliveryConfig::resolve) it into a
//! [`ResolvedConfig`], and pass that value into each delivery.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::types::{Identity, RepositoryTarget};

/// Commit message used when the config does not set one.
pub const DEFAULT_COMMIT_TEMPLATE: &str = "Add blog post: {title}";

// ---------------------------------------------------------------------------
// 1. Types
// ---------------------------------------------------------------------------

/// Per-command timeouts, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Local metadata commands: config, add, status, commit, rev-parse.
    pub metadata_secs: u64,
    /// Commands that talk to the remote: clone, fetch, push.
    pub network_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            metadata_secs: 30,
            network_secs: 300,
        }
    }
}

impl Timeouts {
    pub fn metadata(&self) -> Duration {
        Duration::from_secs(self.metadata_secs)
    }

    pub fn network(&self) -> Duration {
        Duration::from_secs(self.network_secs)
    }
}

/// Credential settings. Only the *name* of the variable is stored; the
/// secret itself never touches the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

/// On-disk delivery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub target: RepositoryTarget,
    pub identity: Identity,
    pub commit_message_template: String,
    pub timeouts: Timeouts,
    pub auth: AuthConfig,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            target: RepositoryTarget::default(),
            identity: Identity::default(),
            commit_message_template: DEFAULT_COMMIT_TEMPLATE.to_string(),
            timeouts: Timeouts::default(),
            auth: AuthConfig::default(),
        }
    }
}

/// Fully-resolved configuration handed to one delivery call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub target: RepositoryTarget,
    pub identity: Identity,
    pub commit_message_template: String,
    pub timeouts: Timeouts,
}

/// Result of [`DeliveryConfig::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConfigReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// 2. Resolve + validate
// ---------------------------------------------------------------------------

impl DeliveryConfig {
    /// Produce the value the pipeline consumes.
    ///
    /// `token` is the secret read by the caller from the variable named in
    /// `auth.token_env`. When present it is embedded in the remote URL as
    /// `https://x-access-token:<token>@host/...`.
    pub fn resolve(&self, token: Option<&str>) -> Result<ResolvedConfig, ConfigError> {
        let mut target = self.target.clone();
        match (self.auth.token_env.as_deref(), token) {
            (_, Some(token)) if !token.is_empty() => {
                target.url = inject_token(&target.url, token)?;
            }
            (Some(var), _) => {
                return Err(ConfigError::MissingToken {
                    var: var.to_string(),
                });
            }
            (None, _) => {}
        }
        Ok(ResolvedConfig {
            target,
            identity: self.identity.clone(),
            commit_message_template: self.commit_message_template.clone(),
            timeouts: self.timeouts,
        })
    }

    pub fn validate(&self) -> ConfigReport {
        let mut report = ConfigReport::default();
        for field in self.target.missing_fields() {
            report.errors.push(format!("target.{field} is required"));
        }
        if self.identity.name.trim().is_empty() {
            report.errors.push("identity.name is required".to_string());
        }
        if self.identity.email.trim().is_empty() {
            report.errors.push("identity.email is required".to_string());
        }
        if self.timeouts.metadata_secs == 0 || self.timeouts.network_secs == 0 {
            report.errors.push("timeouts must be greater than zero".to_string());
        }
        if !self.commit_message_template.contains("{title}") {
            report.warnings.push(
                "commit_message_template has no {title} placeholder; every commit gets the same message"
                    .to_string(),
            );
        }
        if self.target.local_path.is_relative() {
            report.warnings.push(format!(
                "target.local_path '{}' is relative to the current directory",
                self.target.local_path.display()
            ));
        }
        report
    }
}

fn inject_token(url: &str, token: &str) -> Result<String, ConfigError> {
    let rest = url
        .strip_prefix("https://")
        .map(|r| ("https", r))
        .or_else(|| url.strip_prefix("http://").map(|r| ("http", r)));
    let Some((scheme, rest)) = rest else {
        return Err(ConfigError::TokenUnsupported {
            url: url.to_string(),
        });
    };
    // Drop any userinfo already present.
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let host_and_path = match rest[..authority_end].rfind('@') {
        Some(at) => &rest[at + 1..],
        None => rest,
    };
    Ok(format!("{scheme}://x-access-token:{token}@{host_and_path}"))
}

// ---------------------------------------------------------------------------
// 3. Load / save
// ---------------------------------------------------------------------------

/// `<home>/.postbird/config.yaml` — pure, no I/O.
pub fn default_path_at(home: &Path) -> PathBuf {
    home.join(".postbird").join("config.yaml")
}

/// `default_path_at` convenience wrapper.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    Ok(default_path_at(&home()?))
}

/// Load a config file.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<DeliveryConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Atomically save a config file.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(path: &Path, config: &DeliveryConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
    }
    let tmp_path = path.with_extension("yaml.tmp");
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
