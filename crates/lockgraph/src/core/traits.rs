//! The parser interface implemented by each lockfile format.

use crate::core::graph::ParsedLockfile;
use crate::core::types::Manifest;
use crate::error::Result;

/// Parses one package manager's lockfile text into a [`ParsedLockfile`].
///
/// Each package manager has its own lockfile format:
/// - npm: `package-lock.json`
/// - Yarn: `yarn.lock` (classic v1 and Berry share the file name)
/// - pnpm: `pnpm-lock.yaml`
/// - Bun: `bun.lock` (JSON with trailing commas)
///
/// Parsers are stateless; a single value can parse any number of documents.
///
/// # Example
///
/// ```
/// use lockgraph::{LockfileParser, NpmLockfileParser};
///
/// let lock = r#"{"name": "app", "packages": {"": {"name": "app", "version": "1.0.0"}}}"#;
/// let parsed = NpmLockfileParser.parse(lock, None).unwrap();
///
/// assert_eq!(parsed.root_package().name, "app");
/// assert!(NpmLockfileParser.supports_lockfile("package-lock.json"));
/// ```
pub trait LockfileParser {
    /// Parses lockfile text into a dependency graph.
    ///
    /// The manifest is only consulted by formats that do not record the
    /// project's own dependencies (yarn); the others ignore it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The text is not a well-formed document of this format
    /// - A required root entry is missing
    fn parse(&self, contents: &str, manifest: Option<&Manifest>) -> Result<ParsedLockfile>;

    /// Returns `true` if this parser handles the given file name or path.
    fn supports_lockfile(&self, file_name: &str) -> bool {
        file_name_of(file_name) == self.lockfile_name()
    }

    /// The canonical lockfile name handled by this parser.
    fn lockfile_name(&self) -> &str;
}

/// The final path component of a `/` or `\` separated path.
pub(crate) fn file_name_of(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
