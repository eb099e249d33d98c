//! Submodule link resolution: turn a raw submodule URL into browse links.
//!
//! A URL is classified exactly once, in a fixed order: a project on this
//! instance, then a relative path, then a known public host, then the
//! sanitized fallback. The first match wins.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::instance::ProjectRegistry;
use crate::types::ResolvedLinks;

/// Schemes allowed through to a plain external link.
const ALLOWED_SCHEMES: [&str; 4] = ["http", "https", "git", "ssh"];

/// Last two `/`-separated segments at the end of the URL.
#[allow(clippy::expect_used, reason = "static pattern is checked by tests")]
static TAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"([^/:]+)/([^/]+)\z").expect("valid regex"));

/// `github.com/<ns>/<project>` or `github.com:<ns>/<project>` at the end.
#[allow(clippy::expect_used, reason = "static pattern is checked by tests")]
static GITHUB_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"github\.com[/:][^/]+/[^/]+\z").expect("valid regex"));

/// `gitlab.com/<ns>/<project>` or `gitlab.com:<ns>/<project>` at the end.
#[allow(clippy::expect_used, reason = "static pattern is checked by tests")]
static GITLAB_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"gitlab\.com[/:][^/]+/[^/]+\z").expect("valid regex"));

/// Hierarchical URI with a non-empty authority, restricted to the
/// characters RFC 3986 allows unencoded.
#[allow(clippy::expect_used, reason = "static pattern is checked by tests")]
static URI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let pct = "%[0-9A-Fa-f]{2}";
    let sub_delims = "!$&'()*+,;=";
    let unreserved = r"A-Za-z0-9\-._~";
    let pchar = format!("(?:[{unreserved}{sub_delims}:@]|{pct})");
    let userinfo = format!("(?:(?:[{unreserved}{sub_delims}:]|{pct})*@)?");
    let host = format!(r"(?:\[[0-9A-Fa-f:.]+\]|(?:[{unreserved}{sub_delims}]|{pct})+)");
    let pattern = format!(
        r"\A[A-Za-z][A-Za-z0-9+.\-]*://{userinfo}{host}(?::[0-9]*)?(?:/{pchar}*)*(?:\?(?:{pchar}|[/?])*)?(?:#(?:{pchar}|[/?])*)?\z"
    );
    return Regex::new(&pattern).expect("valid regex");
});

/// Who is asking: the hosting instance plus the project being viewed.
pub struct CurrentContext<'a, R: ProjectRegistry> {
    /// Route lookups for the hosting instance.
    pub registry: &'a R,
    /// Full namespace path of the viewed project; relative URLs that climb
    /// only one level land here.
    pub viewer_namespace: &'a str,
    /// Path of the viewed project inside its namespace.
    pub viewer_project: &'a str,
}

/// The `namespace/project` pair found at the end of a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tail {
    /// Second-to-last segment.
    pub namespace: String,
    /// Last segment with trailing whitespace and `.git` removed. Never empty.
    pub project: String,
}

/// Public hosts that get direct link construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicHost {
    /// github.com
    GitHub,
    /// gitlab.com
    GitLab,
}

impl PublicHost {
    /// Host name used when building links.
    pub const fn domain(self) -> &'static str {
        return match self {
            Self::GitHub => "github.com",
            Self::GitLab => "gitlab.com",
        };
    }
}

/// Which branch a URL with a recognizable tail falls into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Not browsable in-app; sanitize and show as a plain link.
    Fallback,
    /// A known public host, linked with the tail's namespace and project.
    KnownHost {
        /// Which host matched.
        host: PublicHost,
    },
    /// A `../` path relative to the viewed project.
    Relative {
        /// Namespace the relative path points into.
        namespace: String,
        /// Project name with `.git` removed.
        project: String,
    },
    /// A project hosted on this instance, named by the tail.
    SelfHosted,
}

/// Resolve the root and commit links for a submodule URL.
///
/// Never fails: unparseable or disallowed URLs come back as `(None, None)`.
pub fn resolve<R: ProjectRegistry>(
    raw_url: &str,
    pinned_id: &str,
    ctx: &CurrentContext<'_, R>,
) -> ResolvedLinks {
    let url = expand_current_directory(raw_url, ctx);

    let Some(tail) = extract_tail(&url) else {
        log::debug!("no namespace/project tail in `{url}`, sanitizing");
        return ResolvedLinks::external(sanitize_url(&url));
    };

    let classification = classify(&url, &tail, ctx);
    log::debug!("`{url}` classified as {classification:?}");

    return match classification {
        Classification::SelfHosted => internal_links(ctx.registry, &tail.namespace, &tail.project, pinned_id),
        Classification::Relative { namespace, project } => {
            internal_links(ctx.registry, &namespace, &project, pinned_id)
        },
        Classification::KnownHost { host } => {
            let base = format!("https://{}/{}/{}", host.domain(), tail.namespace, tail.project);
            let commit = format!("{base}/tree/{pinned_id}");
            ResolvedLinks::browsable(base, commit)
        },
        Classification::Fallback => ResolvedLinks::external(sanitize_url(&url)),
    };
}

/// Classify a URL whose tail was already extracted. Order matters: first match wins.
pub fn classify<R: ProjectRegistry>(
    url: &str,
    tail: &Tail,
    ctx: &CurrentContext<'_, R>,
) -> Classification {
    if is_self_url(url, tail, ctx.registry) {
        return Classification::SelfHosted;
    }

    if is_relative_reference(url) {
        let (namespace, project) = relative_target(url, ctx.viewer_namespace);
        return Classification::Relative { namespace, project };
    }

    if GITHUB_PATTERN.is_match(url) {
        return Classification::KnownHost { host: PublicHost::GitHub };
    }

    if GITLAB_PATTERN.is_match(url) {
        return Classification::KnownHost { host: PublicHost::GitLab };
    }

    return Classification::Fallback;
}

/// Capture the trailing `namespace/project` pair, or `None` when the URL has
/// no such tail or the project is empty once `.git` is stripped.
pub fn extract_tail(url: &str) -> Option<Tail> {
    let caps = TAIL_PATTERN.captures(url)?;
    let namespace = caps.get(1)?.as_str();
    let project = strip_dot_git(caps.get(2)?.as_str().trim_end());

    if project.trim().is_empty() {
        return None;
    }

    return Some(Tail {
        namespace: namespace.to_string(),
        project: project.to_string(),
    });
}

/// True for `../<leaf>` or `../../<namespace>/<leaf>`, either optionally
/// preceded by `./`. The leaf may not start with `..` or contain another `/`,
/// and the namespace may not start with `..`. Deeper climbs never match.
pub fn is_relative_reference(url: &str) -> bool {
    if url.contains('\n') {
        return false;
    }

    let rest = url.strip_prefix("./").unwrap_or(url);
    let Some(rest) = rest.strip_prefix("../") else {
        return false;
    };

    if is_relative_leaf(rest) {
        return true;
    }

    let Some(rest) = rest.strip_prefix("../") else {
        return false;
    };
    if rest.starts_with("..") {
        return false;
    }

    return rest
        .split_once('/')
        .is_some_and(|(_, leaf)| return is_relative_leaf(leaf));
}

/// Sanitize a URL for display as a plain external link.
///
/// Returns `None` unless the URL is a well-formed hierarchical URI
/// (`scheme://authority/path?query#fragment`) whose scheme is one of `http`,
/// `https`, `git`, `ssh`. Scheme comparison is case-sensitive. An accepted
/// URL is returned exactly as written.
pub fn sanitize_url(url: &str) -> Option<String> {
    if !URI_PATTERN.is_match(url) {
        return None;
    }

    let parsed = Url::parse(url).ok()?;
    let scheme = parsed.scheme();

    if !ALLOWED_SCHEMES.contains(&scheme) || !url.starts_with(scheme) {
        return None;
    }

    return Some(url.to_string());
}

/// Rewrite `.` and `./` to the viewed project's own URL.
fn expand_current_directory<R: ProjectRegistry>(raw_url: &str, ctx: &CurrentContext<'_, R>) -> String {
    if raw_url == "." || raw_url == "./" {
        return format!(
            "{}/{}/{}",
            ctx.registry.base_url(),
            ctx.viewer_namespace,
            ctx.viewer_project
        );
    }
    return raw_url.to_string();
}

/// Both in-app links for a project on this instance.
fn internal_links<R: ProjectRegistry>(
    registry: &R,
    namespace: &str,
    project: &str,
    pinned_id: &str,
) -> ResolvedLinks {
    return ResolvedLinks::browsable(
        registry.project_path(namespace, project),
        registry.tree_path(namespace, project, pinned_id),
    );
}

/// A leaf segment of a relative reference.
fn is_relative_leaf(leaf: &str) -> bool {
    return !leaf.starts_with("..") && !leaf.contains('/');
}

/// Does the URL name a project on this instance, by web URL or SSH clone URL?
fn is_self_url<R: ProjectRegistry>(url: &str, tail: &Tail, registry: &R) -> bool {
    let without_dot_git = strip_dot_git(url);

    let web_url = format!("{}/{}/{}", registry.base_url(), tail.namespace, tail.project);
    if without_dot_git == web_url {
        return true;
    }

    let with_dot_git = format!("{without_dot_git}.git");
    return with_dot_git == registry.shell_clone_url(&tail.namespace, &tail.project);
}

/// Namespace and project a relative reference points at. A `..` (or empty)
/// namespace segment means the viewer's own namespace.
fn relative_target(url: &str, viewer_namespace: &str) -> (String, String) {
    let mut components: Vec<&str> = url.split('/').collect();
    let project = strip_dot_git(components.pop().unwrap_or_default().trim_end());
    let namespace = match components.pop() {
        Some(segment) if segment != ".." && !segment.is_empty() => segment,
        _ => viewer_namespace,
    };
    return (namespace.to_string(), project.to_string());
}

/// Remove one trailing `.git`, if present.
fn strip_dot_git(s: &str) -> &str {
    return s.strip_suffix(".git").unwrap_or(s);
}
