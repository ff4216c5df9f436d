//! Error types for lockfile parsing.

use crate::core::types::PackageManager;
use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// Result type for lockfile operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while dispatching or parsing a lockfile.
///
/// Anything not listed here (unresolved references, duplicate alias keys,
/// irregular indentation) is tolerated by leaving the affected edge out.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The underlying JSON or YAML-subset text could not be parsed.
    #[error("Malformed {manager} lockfile: {message}")]
    #[diagnostic(
        code(lockgraph::malformed_document),
        help("The lockfile may be corrupted. Try regenerating it with your package manager")
    )]
    MalformedDocument {
        /// Package manager whose lockfile was being parsed.
        manager: PackageManager,
        /// Description of the parse failure.
        message: String,
    },

    /// The root or root-workspace entry is absent.
    #[error("Invalid {manager} lockfile: missing root package")]
    #[diagnostic(
        code(lockgraph::missing_root),
        help(
            "npm lockfiles need a packages[\"\"] entry and bun lockfiles a workspaces[\"\"] entry; regenerate the lockfile with a current package manager"
        )
    )]
    MissingRoot {
        /// Package manager whose lockfile was being parsed.
        manager: PackageManager,
    },

    /// The dispatcher did not recognize the type tag or file name.
    #[error("Unsupported lock file type: {type_or_file_name}")]
    #[diagnostic(
        code(lockgraph::unsupported_type),
        help(
            "Supported values: package-lock.json, npm-shrinkwrap.json, yarn.lock, pnpm-lock.yaml, bun.lock, bun.lockb, npm, yarn, pnpm, bun, bun-binary"
        )
    )]
    UnsupportedType {
        /// The token that was passed to the dispatcher.
        type_or_file_name: String,
    },

    /// A binary lockfile was requested but no decoder is registered.
    #[error("No binary lockfile decoder registered for {type_or_file_name}")]
    #[diagnostic(
        code(lockgraph::binary_decoder_unavailable),
        help(
            "Register a decoder with LockfileDispatcher::with_binary_decoder, or convert the lockfile to the text format with `bun install --save-text-lockfile`"
        )
    )]
    BinaryDecoderUnavailable {
        /// The token that selected the binary format.
        type_or_file_name: String,
    },

    /// The parser for this format was compiled out.
    #[error("The {manager} lockfile parser is not enabled in this build")]
    #[diagnostic(
        code(lockgraph::parser_disabled),
        help("Enable the matching `parser-*` cargo feature (or `parsers-javascript`)")
    )]
    ParserDisabled {
        /// Package manager whose parser is disabled.
        manager: PackageManager,
    },

    /// A `package.json` manifest could not be deserialized.
    #[error("Invalid package manifest: {source}")]
    #[diagnostic(
        code(lockgraph::invalid_manifest),
        help("Ensure package.json is valid JSON and its dependency maps contain only strings")
    )]
    InvalidManifest {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn malformed(manager: PackageManager, message: impl fmt::Display) -> Self {
        Self::MalformedDocument {
            manager,
            message: message.to_string(),
        }
    }
}
