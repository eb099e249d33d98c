use std::path::Path;

use crate::error::Error;
use crate::instance::{Instance, SshSettings};

/// Name of the config file looked up in the working root.
pub const CONFIG_FILE: &str = ".subref.toml";

/// Project configuration loaded from `.subref.toml`.
/// Every field is optional on disk; command-line overrides fill the gaps.
#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
    /// Hosting instance settings.
    #[serde(default)]
    pub instance: InstanceSection,
    /// The project whose submodules are being viewed.
    #[serde(default)]
    pub viewer: ViewerSection,
}

/// `[instance]` table.
#[derive(Debug, Default, serde::Deserialize)]
pub struct InstanceSection {
    /// Externally visible base URL, e.g. `https://git.example.com`.
    pub base_url: Option<String>,
    /// SSH host for clone URLs.
    pub ssh_host: Option<String>,
    /// SSH port for clone URLs.
    pub ssh_port: Option<u16>,
    /// SSH user for clone URLs.
    pub ssh_user: Option<String>,
}

/// `[viewer]` table.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ViewerSection {
    /// Full namespace path of the viewed project.
    pub namespace: Option<String>,
    /// Project path within its namespace.
    pub project: Option<String>,
}

/// Values given on the command line; they win over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// `--base-url`
    pub base_url: Option<String>,
    /// `--namespace`
    pub namespace: Option<String>,
    /// `--project`
    pub project: Option<String>,
}

/// Fully merged settings needed to resolve links.
#[derive(Debug, Clone)]
pub struct Settings {
    /// The hosting instance.
    pub instance: Instance,
    /// Full namespace path of the viewed project.
    pub viewer_namespace: String,
    /// Path of the viewed project.
    pub viewer_project: String,
}

impl Config {
    /// Load config from `.subref.toml` in the given root directory.
    /// Returns an empty config if the file doesn't exist.
    /// Returns an error if the file exists but is malformed, never silently
    /// falling back to defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        let config: Self = toml::from_str(&content)?;
        log::info!("loaded {}", path.display());
        return Ok(config);
    }

    /// Merge command-line overrides into this config and validate the result.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingSetting` if the base URL, viewer namespace, or
    /// viewer project is set nowhere, or `Error::InvalidSetting` if the base
    /// URL is unusable.
    pub fn into_settings(self, overrides: Overrides) -> Result<Settings, Error> {
        let base_url = require(overrides.base_url.or(self.instance.base_url), "instance.base_url")?;
        let viewer_namespace = require(overrides.namespace.or(self.viewer.namespace), "viewer.namespace")?;
        let viewer_project = require(overrides.project.or(self.viewer.project), "viewer.project")?;

        let ssh = SshSettings {
            host: self.instance.ssh_host,
            port: self.instance.ssh_port,
            user: self.instance.ssh_user,
        };
        let instance = Instance::new(&base_url, &ssh)?;

        return Ok(Settings {
            instance,
            viewer_namespace: viewer_namespace.trim_matches('/').to_string(),
            viewer_project: viewer_project.trim_matches('/').to_string(),
        });
    }
}

/// Unwrap a setting or report it missing.
///
/// # Errors
///
/// Returns `Error::MissingSetting` when the value is absent or blank.
fn require(value: Option<String>, name: &str) -> Result<String, Error> {
    return value
        .filter(|v| return !v.trim().is_empty())
        .ok_or_else(|| return Error::MissingSetting { name: name.to_string() });
}
