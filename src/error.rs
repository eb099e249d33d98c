/// Crate-level error types for subref diagnostics.
use std::path::PathBuf;

/// All errors in subref carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, line, or setting at fault.
/// Link resolution itself never fails; these come from the surrounding I/O.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `.gitmodules` could not be parsed.
    #[error("invalid gitmodules: {}:{line}: {reason}", file.display())]
    GitmodulesInvalid {
        /// File that failed to parse.
        file: PathBuf,
        /// One-based line number of the offending line or section header.
        line: u32,
        /// Description of the problem.
        reason: String,
    },

    /// Expected `.gitmodules` does not exist on disk.
    #[error("gitmodules not found: {}", path.display())]
    GitmodulesNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// A `--pin` argument is not of the form `PATH=ID`.
    #[error("invalid pin `{raw}`: expected PATH=ID")]
    InvalidPin {
        /// The argument as given on the command line.
        raw: String,
    },

    /// A setting is present but unusable.
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting {
        /// Dotted setting name such as `instance.base_url`.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json serialize: {0}")]
    JsonSer(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A submodule listed in `.gitmodules` has no pinned commit.
    #[error("no pin for submodule `{path}` (use --pin {path}=<commit>)")]
    MissingPin {
        /// Submodule path without a pin.
        path: String,
    },

    /// A required setting is absent from both the config file and the flags.
    #[error("missing setting `{name}`")]
    MissingSetting {
        /// Dotted setting name such as `viewer.namespace`.
        name: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
