use std::path::PathBuf;

use serde::Serialize;

use crate::commands;
use crate::config::{self, Overrides};
use crate::gitmodules;
use crate::instance::ProjectRegistry as _;

/// Output the subref reference document.
pub fn run(overrides: Overrides, json: bool) {
    let root = PathBuf::from(".");
    let state = gather_state(&root, overrides);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

/// What subref can see from the working directory.
struct CurrentState {
    /// Whether `.subref.toml` exists.
    config_found: bool,
    /// Effective instance base URL, if settings are complete.
    instance: Option<String>,
    /// Error from merging settings, if any.
    settings_error: Option<String>,
    /// SSH clone prefix, if settings are complete.
    ssh_path_prefix: Option<String>,
    /// Number of entries in `.gitmodules`, if it parses.
    submodules: Option<usize>,
    /// `<namespace>/<project>` being viewed, if settings are complete.
    viewer: Option<String>,
}

fn gather_state(root: &std::path::Path, overrides: Overrides) -> CurrentState {
    let config_found = root.join(config::CONFIG_FILE).exists();
    let submodules = gitmodules::read(&root.join(commands::GITMODULES_FILE))
        .ok()
        .map(|s| s.len());

    return match commands::load_settings(overrides) {
        Ok(settings) => CurrentState {
            config_found,
            instance: Some(settings.instance.base_url().to_string()),
            settings_error: None,
            ssh_path_prefix: Some(settings.instance.ssh_path_prefix().to_string()),
            submodules,
            viewer: Some(format!("{}/{}", settings.viewer_namespace, settings.viewer_project)),
        },
        Err(e) => CurrentState {
            config_found,
            instance: None,
            settings_error: Some(e.to_string()),
            ssh_path_prefix: None,
            submodules,
            viewer: None,
        },
    };
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# subref {version}

Resolve browsable links for git submodule URLs: where to browse a
submodule's root, and where to browse it at the commit the parent pins.

## URL Shapes

    https://<instance>/<ns>/<project>[.git]   this instance -> in-app links
    git@<instance-ssh>:<ns>/<project>.git      this instance -> in-app links
    . or ./                                    the viewed project itself
    ../<project>.git                           sibling in the viewer's namespace
    ../../<ns>/<project>.git                   project in another namespace
    github.com / gitlab.com (https or ssh)     links on the public host
    anything else (http, https, git, ssh)      plain link, no commit link

## Commands

    subref resolve <url> <commit>                 Resolve one URL
    subref links --pin <path>=<commit> ...        Resolve every entry in .gitmodules
    subref info                                   Show this document

## Configuration (.subref.toml)

    [instance]
    base_url = \"https://git.example.com\"
    ssh_user = \"git\"                    # default git
    ssh_port = 22                       # default 22

    [viewer]
    namespace = \"acme\"
    project = \"widgets\"

## Current State

"
    );
}

fn print_markdown_state(state: &CurrentState) {
    if state.config_found {
        println!("Config:     .subref.toml (found)");
    } else {
        println!("Config:     .subref.toml (not found)");
    }

    match (&state.instance, &state.settings_error) {
        (Some(instance), _) => println!("Instance:   {instance}"),
        (None, Some(reason)) => println!("Instance:   (unusable: {reason})"),
        (None, None) => println!("Instance:   (none)"),
    }

    if let Some(prefix) = &state.ssh_path_prefix {
        println!("SSH prefix: {prefix}");
    }

    if let Some(viewer) = &state.viewer {
        println!("Viewer:     {viewer}");
    }

    match state.submodules {
        Some(n) => println!("Submodules: .gitmodules ({n} entries)"),
        None => println!("Submodules: .gitmodules (not found)"),
    }
}

fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

| Code | Meaning |
|------|---------|
| 0    | Success |
| 1    | Runtime error |
"
    );
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    version: String,
    exit_codes: Vec<ExitCodeInfo>,
    current_state: StateJson,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct StateJson {
    config_found: bool,
    instance: Option<String>,
    settings_error: Option<String>,
    ssh_path_prefix: Option<String>,
    submodules: Option<usize>,
    viewer: Option<String>,
}

fn print_json(state: &CurrentState) {
    let info = InfoJson {
        version: env!("CARGO_PKG_VERSION").to_string(),
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Success".to_string() },
            ExitCodeInfo { code: 1, meaning: "Runtime error".to_string() },
        ],
        current_state: StateJson {
            config_found: state.config_found,
            instance: state.instance.clone(),
            settings_error: state.settings_error.clone(),
            ssh_path_prefix: state.ssh_path_prefix.clone(),
            submodules: state.submodules,
            viewer: state.viewer.clone(),
        },
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
