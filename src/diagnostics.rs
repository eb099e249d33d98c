use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where the user can
/// act on it, how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::GitmodulesNotFound { path } => render_gitmodules_not_found(&path.display().to_string()),
        Error::GitmodulesInvalid { file, line, reason } => {
            render_gitmodules_invalid(&file.display().to_string(), *line, reason)
        },
        Error::MissingSetting { name } => render_missing_setting(name),
        Error::MissingPin { path } => render_missing_pin(path),
        _ => render_generic(e),
    }
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::InvalidPin { raw } => format!("\
# Error: Invalid Pin

`{raw}` is not of the form `PATH=ID`.

## Fix

    subref links --pin vendor/lib=1a2b3c4
"),

        Error::InvalidSetting { name, reason } => format!("\
# Error: Invalid Setting

`{name}` is unusable: {reason}

## Fix

Use an absolute `http` or `https` URL such as `https://git.example.com`.
"),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::JsonSer(e) => format!("\
# Error: JSON Serialization

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_gitmodules_not_found(path: &str) -> String {
    format!(
        "\
# Error: Gitmodules Not Found

`{path}` does not exist.

## Fix

Run from the repository root, or point at the file:

    subref links --gitmodules path/to/.gitmodules
"
    )
}

fn render_gitmodules_invalid(file: &str, line: u32, reason: &str) -> String {
    format!(
        "\
# Error: Invalid Gitmodules

`{file}` line {line}: {reason}

## Fix

Each submodule needs a section with both keys:

    [submodule \"name\"]
    \tpath = path/in/repo
    \turl = https://example.com/group/project.git
"
    )
}

fn render_missing_setting(name: &str) -> String {
    let flag = match name {
        "instance.base_url" => "--base-url https://git.example.com",
        "viewer.namespace" => "--namespace <group>",
        _ => "--project <project>",
    };
    let (table, key) = name.split_once('.').unwrap_or(("", name));

    format!(
        "\
# Error: Missing Setting

`{name}` is not set.

## Fix

Add it to `.subref.toml`:

    [{table}]
    {key} = \"...\"

Or pass it on the command line:

    {flag}
"
    )
}

fn render_missing_pin(path: &str) -> String {
    format!(
        "\
# Error: Missing Pin

Submodule `{path}` has no pinned commit.

## Fix

Pass the commit the parent records for it, e.g. from `git ls-tree HEAD {path}`:

    subref links --pin {path}=<commit>
"
    )
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn missing_setting_names_table_and_flag() {
        let md = render_error(&Error::MissingSetting { name: "viewer.namespace".to_string() });
        assert!(md.contains("[viewer]"), "table heading missing: {md}");
        assert!(md.contains("namespace = "), "key missing: {md}");
        assert!(md.contains("--namespace"), "flag missing: {md}");
    }

    #[test]
    fn invalid_gitmodules_names_line() {
        let md = render_error(&Error::GitmodulesInvalid {
            file: ".gitmodules".into(),
            line: 7,
            reason: "submodule `a` has no url".to_string(),
        });
        assert!(md.starts_with("# Error: Invalid Gitmodules"), "heading missing: {md}");
        assert!(md.contains("line 7"), "line missing: {md}");
    }
}
