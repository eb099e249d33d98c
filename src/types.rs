/// Core domain types for submodule entries and their resolved links.
use serde::Serialize;

/// One `[submodule "..."]` section parsed from `.gitmodules`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submodule {
    /// One-based line number of the section header.
    pub line: u32,
    /// Section name from the header, usually the same as the path.
    pub name: String,
    /// Location of the submodule inside the parent repository.
    pub path: String,
    /// Raw URL exactly as written in the file, possibly malformed.
    pub url: String,
}

/// A submodule together with the commit (or ref) the parent pins it to.
/// Built per render, never persisted.
#[derive(Debug, Clone)]
pub struct SubmoduleReference {
    /// Path of the submodule inside the parent repository.
    pub path_in_parent: String,
    /// Commit SHA or ref name, used only for interpolation.
    pub pinned_id: String,
    /// Raw URL as stored in submodule metadata.
    pub raw_url: String,
}

impl SubmoduleReference {
    /// Pair a parsed submodule entry with its pinned identifier.
    pub fn new(submodule: &Submodule, pinned_id: &str) -> Self {
        return Self {
            path_in_parent: submodule.path.clone(),
            pinned_id: pinned_id.to_string(),
            raw_url: submodule.url.clone(),
        };
    }
}

/// Browse links for one submodule. A `None` root link means nothing
/// browsable was found and the caller should render inert text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLinks {
    /// Link to the submodule at the pinned commit, when one can be built.
    pub commit_link: Option<String>,
    /// Link to the submodule's root.
    pub root_link: Option<String>,
}

impl ResolvedLinks {
    /// Both links present.
    pub const fn browsable(root_link: String, commit_link: String) -> Self {
        return Self {
            commit_link: Some(commit_link),
            root_link: Some(root_link),
        };
    }

    /// Root link only; used for external URLs that cannot be browsed at a commit.
    pub const fn external(root_link: Option<String>) -> Self {
        return Self {
            commit_link: None,
            root_link,
        };
    }
}
