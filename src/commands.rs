//! Core CLI commands for subref: resolve and links.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::config::{Config, Overrides, Settings};
use crate::error;
use crate::gitmodules;
use crate::resolver::{self, CurrentContext};
use crate::types::{ResolvedLinks, SubmoduleReference};

/// Default `.gitmodules` location relative to the working root.
pub const GITMODULES_FILE: &str = ".gitmodules";

/// One resolved submodule, as printed.
#[derive(Serialize)]
struct LinkRow {
    /// Links computed for the submodule.
    #[serde(flatten)]
    links: ResolvedLinks,
    /// Section name from `.gitmodules`.
    name: String,
    /// Path inside the parent repository.
    path: String,
    /// Commit or ref the parent pins.
    pinned_id: String,
    /// Raw URL as stored.
    url: String,
}

/// JSON envelope for `links --json`.
#[derive(Serialize)]
struct LinksReport<'a> {
    /// Every submodule, in file order.
    submodules: &'a [LinkRow],
}

/// Resolve a single raw URL and print its links.
///
/// # Errors
///
/// Returns errors from config loading or JSON serialization.
pub fn resolve(raw_url: &str, pinned_id: &str, overrides: Overrides, json: bool) -> Result<ExitCode, error::Error> {
    let settings = load_settings(overrides)?;
    let links = resolve_with(&settings, raw_url, pinned_id);

    if json {
        println!("{}", serde_json::to_string_pretty(&links)?);
    } else {
        println!("root:   {}", display_root(&links, raw_url));
        println!("commit: {}", links.commit_link.as_deref().unwrap_or("-"));
    }

    return Ok(ExitCode::SUCCESS);
}

/// Resolve every submodule in `.gitmodules` at its pinned commit and print the links.
///
/// # Errors
///
/// Returns errors from config or `.gitmodules` loading, `Error::InvalidPin`
/// for a malformed `--pin`, or `Error::MissingPin` for an unpinned submodule.
pub fn links(
    gitmodules_path: Option<&Path>,
    pins: &[String],
    overrides: Overrides,
    json: bool,
) -> Result<ExitCode, error::Error> {
    let settings = load_settings(overrides)?;
    let path = gitmodules_path.map_or_else(|| return PathBuf::from(GITMODULES_FILE), Path::to_path_buf);
    let submodules = gitmodules::read(&path)?;
    let pins = parse_pins(pins)?;
    log::info!("{} submodules in {}", submodules.len(), path.display());

    let mut rows = Vec::with_capacity(submodules.len());
    for submodule in &submodules {
        let Some(pinned_id) = pins.get(submodule.path.trim_matches('/')) else {
            return Err(error::Error::MissingPin { path: submodule.path.clone() });
        };
        log::debug!("submodule `{}` (line {}) pinned at {pinned_id}", submodule.name, submodule.line);
        let reference = SubmoduleReference::new(submodule, pinned_id);
        let links = resolve_with(&settings, &reference.raw_url, &reference.pinned_id);

        rows.push(LinkRow {
            links,
            name: submodule.name.clone(),
            path: reference.path_in_parent,
            pinned_id: reference.pinned_id,
            url: reference.raw_url,
        });
    }

    if json {
        let report = LinksReport { submodules: &rows };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if rows.is_empty() {
        println!("No submodules in {}", path.display());
    } else {
        print_rows(&rows);
    }

    return Ok(ExitCode::SUCCESS);
}

/// Load `.subref.toml` from the working directory and merge overrides.
///
/// # Errors
///
/// Returns errors from config loading or validation.
pub fn load_settings(overrides: Overrides) -> Result<Settings, error::Error> {
    let root = PathBuf::from(".");
    return Config::load(&root)?.into_settings(overrides);
}

/// Resolve one URL against merged settings.
fn resolve_with(settings: &Settings, raw_url: &str, pinned_id: &str) -> ResolvedLinks {
    let ctx = CurrentContext {
        registry: &settings.instance,
        viewer_namespace: &settings.viewer_namespace,
        viewer_project: &settings.viewer_project,
    };
    return resolver::resolve(raw_url, pinned_id, &ctx);
}

/// Parse `PATH=ID` pins into a lookup table. Later pins for the same path win.
///
/// # Errors
///
/// Returns `Error::InvalidPin` if a pin has no `=` or an empty side.
fn parse_pins(pins: &[String]) -> Result<HashMap<&str, &str>, error::Error> {
    let mut table = HashMap::new();
    for raw in pins {
        let Some((path, id)) = raw.split_once('=') else {
            return Err(error::Error::InvalidPin { raw: raw.clone() });
        };
        let path = path.trim().trim_matches('/');
        let id = id.trim();
        if path.is_empty() || id.is_empty() {
            return Err(error::Error::InvalidPin { raw: raw.clone() });
        }
        table.insert(path, id);
    }
    return Ok(table);
}

/// Root link, or the raw URL flagged as not browsable.
fn display_root(links: &ResolvedLinks, raw_url: &str) -> String {
    return links
        .root_link
        .clone()
        .unwrap_or_else(|| return format!("{raw_url} (not browsable)"));
}

/// Print one block per submodule.
fn print_rows(rows: &[LinkRow]) {
    for (index, row) in rows.iter().enumerate() {
        if index > 0 {
            println!();
        }
        println!("{} @ {}", row.path, row.pinned_id);
        println!("  root:   {}", display_root(&row.links, &row.url));
        println!("  commit: {}", row.links.commit_link.as_deref().unwrap_or("-"));
    }
    return;
}
