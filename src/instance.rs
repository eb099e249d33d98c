//! The hosting instance: base URL, internal route paths, and SSH clone URLs.

use url::Url;

use crate::error::Error;

/// Default SSH port; clone URLs on this port use the short scp-like form.
const DEFAULT_SSH_PORT: u16 = 22;

/// Route lookups supplied by the hosting application. The resolver only ever
/// asks these questions and never touches a database or the filesystem.
pub trait ProjectRegistry {
    /// Externally visible base URL, without a trailing slash.
    fn base_url(&self) -> &str;

    /// Internal path to a project's root page.
    fn project_path(&self, namespace: &str, project: &str) -> String;

    /// Canonical SSH clone URL for a project, including the `.git` suffix.
    fn shell_clone_url(&self, namespace: &str, project: &str) -> String;

    /// Internal path to a project's file tree at a commit.
    fn tree_path(&self, namespace: &str, project: &str, commit: &str) -> String;
}

/// A hosting instance described by its base URL and SSH endpoint.
#[derive(Debug, Clone)]
pub struct Instance {
    /// Base URL with any trailing slash removed.
    base_url: String,
    /// Path prefix under which the instance is mounted, empty at the root.
    relative_url_root: String,
    /// Everything before `<namespace>/<project>.git` in a clone URL.
    ssh_path_prefix: String,
}

/// SSH endpoint overrides. Unset fields fall back to defaults derived from the base URL.
#[derive(Debug, Clone, Default)]
pub struct SshSettings {
    /// Host name; defaults to the base URL's host.
    pub host: Option<String>,
    /// Port; defaults to 22.
    pub port: Option<u16>,
    /// Login user; defaults to `git`.
    pub user: Option<String>,
}

impl Instance {
    /// Build an instance from its base URL.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSetting` if the base URL does not parse, is not
    /// `http`/`https`, or has no host.
    pub fn new(base_url: &str, ssh: &SshSettings) -> Result<Self, Error> {
        let trimmed = base_url.trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|e| {
            return Error::InvalidSetting {
                name: "instance.base_url".to_string(),
                reason: e.to_string(),
            };
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidSetting {
                name: "instance.base_url".to_string(),
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }

        let Some(url_host) = parsed.host_str() else {
            return Err(Error::InvalidSetting {
                name: "instance.base_url".to_string(),
                reason: "no host".to_string(),
            });
        };

        let host = ssh.host.clone().unwrap_or_else(|| return url_host.to_string());
        let user = ssh.user.clone().unwrap_or_else(|| return "git".to_string());
        let port = ssh.port.unwrap_or(DEFAULT_SSH_PORT);

        let ssh_path_prefix = if port == DEFAULT_SSH_PORT {
            format!("{user}@{host}:")
        } else {
            format!("ssh://{user}@{host}:{port}/")
        };

        return Ok(Self {
            base_url: trimmed.to_string(),
            relative_url_root: parsed.path().trim_end_matches('/').to_string(),
            ssh_path_prefix,
        });
    }

    /// The prefix prepended to `<namespace>/<project>.git` for SSH clones.
    pub fn ssh_path_prefix(&self) -> &str {
        return &self.ssh_path_prefix;
    }
}

impl ProjectRegistry for Instance {
    fn base_url(&self) -> &str {
        return &self.base_url;
    }

    fn project_path(&self, namespace: &str, project: &str) -> String {
        return format!("{}/{namespace}/{project}", self.relative_url_root);
    }

    fn shell_clone_url(&self, namespace: &str, project: &str) -> String {
        return format!("{}{namespace}/{project}.git", self.ssh_path_prefix);
    }

    fn tree_path(&self, namespace: &str, project: &str, commit: &str) -> String {
        return format!("{}/tree/{commit}", self.project_path(namespace, project));
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn derives_routes_from_root_instance() {
        let instance = Instance::new("https://git.example.com/", &SshSettings::default()).unwrap();
        assert_eq!(instance.base_url(), "https://git.example.com");
        assert_eq!(instance.project_path("acme", "widgets"), "/acme/widgets");
        assert_eq!(
            instance.tree_path("acme", "widgets", "abc123"),
            "/acme/widgets/tree/abc123"
        );
        assert_eq!(
            instance.shell_clone_url("acme", "widgets"),
            "git@git.example.com:acme/widgets.git"
        );
    }

    #[test]
    fn keeps_relative_url_root() {
        let instance = Instance::new("https://example.com/gitlab", &SshSettings::default()).unwrap();
        assert_eq!(instance.project_path("acme", "widgets"), "/gitlab/acme/widgets");
    }

    #[test]
    fn non_default_port_uses_ssh_scheme() {
        let ssh = SshSettings {
            host: Some("ssh.example.com".to_string()),
            port: Some(2222),
            user: Some("gitlab".to_string()),
        };
        let instance = Instance::new("https://git.example.com", &ssh).unwrap();
        assert_eq!(
            instance.shell_clone_url("acme", "widgets"),
            "ssh://gitlab@ssh.example.com:2222/acme/widgets.git"
        );
    }

    #[test]
    fn rejects_non_http_base_url() {
        let result = Instance::new("git://git.example.com", &SshSettings::default());
        assert!(
            matches!(result, Err(Error::InvalidSetting { .. })),
            "git scheme should be rejected"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let result = Instance::new("git.example.com", &SshSettings::default());
        assert!(
            matches!(result, Err(Error::InvalidSetting { .. })),
            "missing scheme should be rejected"
        );
    }
}
