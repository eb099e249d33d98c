use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::types::Submodule;

/// `[submodule "name"]` section header.
#[allow(clippy::expect_used, reason = "static pattern is checked by tests")]
static SUBMODULE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r#"^\[\s*submodule\s+"((?:[^"\\]|\\.)*)"\s*\]$"#).expect("valid regex");
});

/// Any other `[section]` or `[section "sub"]` header.
#[allow(clippy::expect_used, reason = "static pattern is checked by tests")]
static OTHER_HEADER: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r#"^\[[^\]]*\]$"#).expect("valid regex"));

/// `key = value` line; git config keys start with a letter.
#[allow(clippy::expect_used, reason = "static pattern is checked by tests")]
static KEY_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^([A-Za-z][A-Za-z0-9-]*)\s*=\s*(.*)$").expect("valid regex");
});

/// A submodule section still being read.
struct PendingSection {
    /// Header line number.
    line: u32,
    /// Section name.
    name: String,
    /// `path` value, once seen.
    path: Option<String>,
    /// `url` value, once seen.
    url: Option<String>,
}

/// What the parser is inside of.
enum Section {
    /// A section other than `submodule`; its keys are ignored.
    Ignored,
    /// Before the first header.
    Preamble,
    /// A `[submodule "..."]` section.
    Submodule(PendingSection),
}

/// Read and parse a `.gitmodules` file.
///
/// # Errors
///
/// Returns `Error::GitmodulesNotFound` if the file does not exist,
/// `Error::Io` for other read failures,
/// or `Error::GitmodulesInvalid` if the content cannot be parsed.
pub fn read(path: &Path) -> Result<Vec<Submodule>, Error> {
    let content = match std::fs::read_to_string(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::GitmodulesNotFound { path: path.to_path_buf() });
        },
        Err(e) => return Err(Error::Io(e)),
        Ok(c) => c,
    };
    return parse(path, &content);
}

/// Parse `.gitmodules` content into submodule entries, in file order.
///
/// # Errors
///
/// Returns `Error::GitmodulesInvalid` for an unparseable line, a key outside
/// any section, or a submodule section without `path` or `url`.
pub fn parse(file: &Path, content: &str) -> Result<Vec<Submodule>, Error> {
    let mut submodules = Vec::new();
    let mut section = Section::Preamble;

    for (line_no, logical_line) in join_continued_lines(content) {
        let line = logical_line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(cap) = SUBMODULE_HEADER.captures(line) {
            finish_section(file, section, &mut submodules)?;
            let name = cap.get(1).map_or("", |m| return m.as_str());
            section = Section::Submodule(PendingSection {
                line: line_no,
                name: unescape(name),
                path: None,
                url: None,
            });
            continue;
        }

        if OTHER_HEADER.is_match(line) {
            finish_section(file, section, &mut submodules)?;
            section = Section::Ignored;
            continue;
        }

        let Some(cap) = KEY_VALUE.captures(line) else {
            return Err(invalid(file, line_no, format!("cannot parse line `{line}`")));
        };
        let key = cap.get(1).map_or("", |m| return m.as_str()).to_ascii_lowercase();
        let value = parse_value(cap.get(2).map_or("", |m| return m.as_str()));

        match &mut section {
            Section::Ignored => {},
            Section::Preamble => {
                return Err(invalid(file, line_no, format!("key `{key}` outside of a section")));
            },
            Section::Submodule(pending) => match key.as_str() {
                "path" => pending.path = Some(value),
                "url" => pending.url = Some(value),
                _ => {},
            },
        }
    }

    finish_section(file, section, &mut submodules)?;
    return Ok(submodules);
}

/// Join lines ending in an unescaped `\` with the line that follows, as git
/// config does. Each logical line keeps the number of its first physical line.
fn join_continued_lines(content: &str) -> Vec<(u32, String)> {
    let mut logical = Vec::new();
    let mut pending: Option<(u32, String)> = None;

    for (index, raw_line) in content.lines().enumerate() {
        let line_no: u32 = index.saturating_add(1).try_into().unwrap_or(u32::MAX);
        let (start, mut text) = pending.take().unwrap_or_else(|| return (line_no, String::new()));
        text.push_str(raw_line);

        let trailing_backslashes = text.chars().rev().take_while(|c| return *c == '\\').count();
        if trailing_backslashes % 2 == 1 {
            text.pop();
            pending = Some((start, text));
        } else {
            logical.push((start, text));
        }
    }

    if let Some(last) = pending {
        logical.push(last);
    }
    return logical;
}

/// Close the current section, pushing a complete submodule entry.
///
/// # Errors
///
/// Returns `Error::GitmodulesInvalid` if a submodule section lacks `path` or `url`.
fn finish_section(file: &Path, section: Section, submodules: &mut Vec<Submodule>) -> Result<(), Error> {
    let Section::Submodule(pending) = section else {
        return Ok(());
    };

    let Some(path) = pending.path else {
        return Err(invalid(file, pending.line, format!("submodule `{}` has no path", pending.name)));
    };
    let Some(url) = pending.url else {
        return Err(invalid(file, pending.line, format!("submodule `{}` has no url", pending.name)));
    };

    submodules.push(Submodule {
        line: pending.line,
        name: pending.name,
        path,
        url,
    });
    return Ok(());
}

/// Build a `GitmodulesInvalid` error.
fn invalid(file: &Path, line: u32, reason: String) -> Error {
    return Error::GitmodulesInvalid {
        file: file.to_path_buf(),
        line,
        reason,
    };
}

/// Strip an inline comment and surrounding quotes from a value.
/// Comment characters inside double quotes are kept.
fn parse_value(raw: &str) -> String {
    let mut out = String::new();
    let mut in_quotes = false;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(unescape_char(escaped));
                }
            },
            '#' | ';' if !in_quotes => break,
            other => out.push(other),
        }
    }

    return out.trim_end().to_string();
}

/// Undo backslash escapes in a section name.
fn unescape(name: &str) -> String {
    let mut out = String::new();
    let mut chars = name.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    return out;
}

/// Map the character after a backslash in a value.
const fn unescape_char(c: char) -> char {
    return match c {
        'n' => '\n',
        't' => '\t',
        'b' => '\u{8}',
        other => other,
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    fn parse_str(content: &str) -> Result<Vec<Submodule>, Error> {
        parse(Path::new(".gitmodules"), content)
    }

    #[test]
    fn parses_sections_in_order() {
        let content = "\
[submodule \"vendor/rails\"]
\tpath = vendor/rails
\turl = git@github.com:rails/rails.git
[submodule \"lib/widgets\"]
\tpath = lib/widgets
\turl = ../widgets.git
";
        let submodules = parse_str(content).unwrap();
        assert_eq!(submodules.len(), 2);
        assert_eq!(submodules[0].name, "vendor/rails");
        assert_eq!(submodules[0].url, "git@github.com:rails/rails.git");
        assert_eq!(submodules[0].line, 1);
        assert_eq!(submodules[1].path, "lib/widgets");
        assert_eq!(submodules[1].url, "../widgets.git");
        assert_eq!(submodules[1].line, 4);
    }

    #[test]
    fn keys_are_case_insensitive_and_comments_skipped() {
        let content = "\
# top comment
[submodule \"a\"]
  ; indented comment
  Path = a
  URL = \"https://example.org/x/a.git\" # trailing
  branch = main
";
        let submodules = parse_str(content).unwrap();
        assert_eq!(submodules.len(), 1);
        assert_eq!(submodules[0].path, "a");
        assert_eq!(submodules[0].url, "https://example.org/x/a.git");
    }

    #[test]
    fn ignores_other_sections() {
        let content = "\
[core]
\tbare = false
[submodule \"a\"]
\tpath = a
\turl = ./
";
        let submodules = parse_str(content).unwrap();
        assert_eq!(submodules.len(), 1);
        assert_eq!(submodules[0].url, "./");
    }

    #[test]
    fn missing_url_names_section_line() {
        let content = "\n[submodule \"a\"]\n\tpath = a\n";
        let err = parse_str(content).unwrap_err();
        assert!(
            matches!(err, Error::GitmodulesInvalid { line: 2, .. }),
            "expected invalid at line 2, got {err:?}"
        );
    }

    #[test]
    fn key_outside_section_is_rejected() {
        let err = parse_str("url = x\n").unwrap_err();
        assert!(
            matches!(err, Error::GitmodulesInvalid { line: 1, .. }),
            "expected invalid at line 1, got {err:?}"
        );
    }

    #[test]
    fn garbage_line_is_rejected() {
        let err = parse_str("[submodule \"a\"]\n\t???\n").unwrap_err();
        assert!(
            matches!(err, Error::GitmodulesInvalid { line: 2, .. }),
            "expected invalid at line 2, got {err:?}"
        );
    }

    #[test]
    fn continued_value_joins_next_line() {
        let content = "\
[submodule \"a\"]
\tpath = a
\turl = https://example.org/\\
acme/a.git
[submodule \"b\"]
\tpath = b
\turl = ../b.git
";
        let submodules = parse_str(content).unwrap();
        assert_eq!(submodules.len(), 2);
        assert_eq!(submodules[0].url, "https://example.org/acme/a.git");
        assert_eq!(submodules[1].line, 5);
    }

    #[test]
    fn escaped_trailing_backslash_does_not_continue() {
        let content = "[submodule \"a\"]\n\tpath = a\\\\\n\turl = ../a.git\n";
        let submodules = parse_str(content).unwrap();
        assert_eq!(submodules[0].path, "a\\");
        assert_eq!(submodules[0].url, "../a.git");
    }

    #[test]
    fn empty_file_has_no_submodules() {
        assert!(parse_str("").unwrap().is_empty(), "no sections expected");
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".gitmodules");
        assert!(
            matches!(read(&path), Err(Error::GitmodulesNotFound { .. })),
            "expected not found"
        );
    }
}
