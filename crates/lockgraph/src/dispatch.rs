//! Selecting a parser from a lockfile type tag or file name.

use crate::core::graph::ParsedLockfile;
use crate::core::traits::file_name_of;
use crate::core::types::{Manifest, PackageManager};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Lockfile formats the dispatcher recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockfileType {
    /// `package-lock.json` / `npm-shrinkwrap.json`
    Npm,
    /// `yarn.lock` (classic or Berry)
    Yarn,
    /// `pnpm-lock.yaml`
    Pnpm,
    /// `bun.lock`
    Bun,
    /// `bun.lockb`, decoded by a registered [`BinaryLockfileDecoder`]
    BunBinary,
}

impl LockfileType {
    /// Maps a type tag (`npm`, `bun-binary`, ...) or a lockfile name to a type.
    ///
    /// Paths are matched on their final component.
    ///
    /// ```
    /// use lockgraph::LockfileType;
    ///
    /// assert_eq!(LockfileType::from_type_or_file_name("pnpm"), Some(LockfileType::Pnpm));
    /// assert_eq!(LockfileType::from_type_or_file_name("/repo/bun.lockb"), Some(LockfileType::BunBinary));
    /// assert_eq!(LockfileType::from_type_or_file_name("Cargo.lock"), None);
    /// ```
    #[must_use]
    pub fn from_type_or_file_name(token: &str) -> Option<Self> {
        match file_name_of(token) {
            "package-lock.json" | "npm-shrinkwrap.json" | "npm" => Some(Self::Npm),
            "yarn.lock" | "yarn" => Some(Self::Yarn),
            "pnpm-lock.yaml" | "pnpm" => Some(Self::Pnpm),
            "bun.lock" | "bun" => Some(Self::Bun),
            "bun.lockb" | "bun-binary" => Some(Self::BunBinary),
            _ => None,
        }
    }

    /// The package manager that writes this format.
    #[must_use]
    pub const fn manager(self) -> PackageManager {
        match self {
            Self::Npm => PackageManager::Npm,
            Self::Yarn => PackageManager::Yarn,
            Self::Pnpm => PackageManager::Pnpm,
            Self::Bun | Self::BunBinary => PackageManager::Bun,
        }
    }

    /// Returns `true` for formats that are not UTF-8 text.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        matches!(self, Self::BunBinary)
    }
}

impl FromStr for LockfileType {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self> {
        Self::from_type_or_file_name(token).ok_or_else(|| Error::UnsupportedType {
            type_or_file_name: token.to_string(),
        })
    }
}

impl fmt::Display for LockfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
            Self::BunBinary => "bun-binary",
        })
    }
}

/// Decodes a binary lockfile into the same shape the text parsers produce.
///
/// The crate does not ship a `bun.lockb` decoder; register one on a
/// [`LockfileDispatcher`] to accept that format.
pub trait BinaryLockfileDecoder: Send + Sync {
    /// Decodes raw lockfile bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid lockfile.
    fn decode(&self, input: &[u8], manifest: Option<&Manifest>) -> Result<ParsedLockfile>;
}

/// Routes lockfile input to the parser for its format.
///
/// # Example
///
/// ```
/// use lockgraph::LockfileDispatcher;
///
/// let dispatcher = LockfileDispatcher::new();
/// let lock = "lockfileVersion: '9.0'\n\nimporters:\n  .:\n    dependencies:\n      a:\n        specifier: ^1.0.0\n        version: 1.0.0\n";
///
/// let parsed = dispatcher.parse(lock, "pnpm-lock.yaml", None).unwrap();
/// assert_eq!(parsed.root_package().dependencies.len(), 1);
/// ```
#[derive(Default)]
pub struct LockfileDispatcher {
    binary_decoder: Option<Box<dyn BinaryLockfileDecoder>>,
}

impl LockfileDispatcher {
    /// Creates a dispatcher without a binary decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the decoder used for `bun.lockb`.
    #[must_use]
    pub fn with_binary_decoder(mut self, decoder: impl BinaryLockfileDecoder + 'static) -> Self {
        self.binary_decoder = Some(Box::new(decoder));
        self
    }

    /// Parses lockfile text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] for unknown tokens, or whatever the
    /// selected parser reports.
    pub fn parse(
        &self,
        input: &str,
        type_or_file_name: &str,
        manifest: Option<&Manifest>,
    ) -> Result<ParsedLockfile> {
        self.parse_bytes(input.as_bytes(), type_or_file_name, manifest)
    }

    /// Parses raw lockfile bytes. Text formats must be UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] for unknown tokens,
    /// [`Error::BinaryDecoderUnavailable`] for `bun.lockb` without a decoder,
    /// [`Error::MalformedDocument`] for non-UTF-8 text, or whatever the
    /// selected parser reports.
    pub fn parse_bytes(
        &self,
        input: &[u8],
        type_or_file_name: &str,
        manifest: Option<&Manifest>,
    ) -> Result<ParsedLockfile> {
        let lockfile_type: LockfileType = type_or_file_name.parse()?;
        debug!(%lockfile_type, token = type_or_file_name, "dispatching lockfile");

        if lockfile_type.is_binary() {
            let decoder = self
                .binary_decoder
                .as_deref()
                .ok_or_else(|| Error::BinaryDecoderUnavailable {
                    type_or_file_name: type_or_file_name.to_string(),
                })?;
            return decoder.decode(input, manifest);
        }

        let manager = lockfile_type.manager();
        let contents = std::str::from_utf8(input).map_err(|err| Error::malformed(manager, err))?;
        parse_text(lockfile_type, contents, manifest)
    }
}

impl fmt::Debug for LockfileDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockfileDispatcher")
            .field("binary_decoder", &self.binary_decoder.is_some())
            .finish()
    }
}

fn parse_text(
    lockfile_type: LockfileType,
    contents: &str,
    manifest: Option<&Manifest>,
) -> Result<ParsedLockfile> {
    #[cfg(any(
        feature = "parser-npm",
        feature = "parser-yarn",
        feature = "parser-pnpm",
        feature = "parser-bun"
    ))]
    use crate::{core::traits::LockfileParser, parsers::javascript};

    match lockfile_type {
        #[cfg(feature = "parser-npm")]
        LockfileType::Npm => javascript::NpmLockfileParser.parse(contents, manifest),
        #[cfg(feature = "parser-yarn")]
        LockfileType::Yarn => javascript::YarnLockfileParser.parse(contents, manifest),
        #[cfg(feature = "parser-pnpm")]
        LockfileType::Pnpm => javascript::PnpmLockfileParser.parse(contents, manifest),
        #[cfg(feature = "parser-bun")]
        LockfileType::Bun => javascript::BunLockfileParser.parse(contents, manifest),
        #[allow(unreachable_patterns)]
        disabled => {
            let (_contents, _manifest) = (contents, manifest);
            Err(Error::ParserDisabled {
                manager: disabled.manager(),
            })
        }
    }
}

/// Parses lockfile text with a default [`LockfileDispatcher`].
///
/// `type_or_file_name` is a lockfile name (`yarn.lock`, `/repo/pnpm-lock.yaml`)
/// or a type tag (`npm`, `yarn`, `pnpm`, `bun`, `bun-binary`). The manifest is
/// only used for yarn, whose lockfile does not record the project's own
/// dependencies.
///
/// # Errors
///
/// See [`LockfileDispatcher::parse_bytes`].
///
/// # Example
///
/// ```
/// let lock = r#"{"packages": {"": {"name": "app", "version": "1.0.0"}}}"#;
/// let parsed = lockgraph::parse(lock, "package-lock.json", None).unwrap();
///
/// assert_eq!(parsed.manager(), lockgraph::PackageManager::Npm);
/// assert_eq!(parsed.package_count(), 0);
/// ```
pub fn parse(
    input: &str,
    type_or_file_name: &str,
    manifest: Option<&Manifest>,
) -> Result<ParsedLockfile> {
    LockfileDispatcher::new().parse(input, type_or_file_name, manifest)
}

/// Byte-input form of [`parse`].
///
/// # Errors
///
/// See [`LockfileDispatcher::parse_bytes`].
pub fn parse_bytes(
    input: &[u8],
    type_or_file_name: &str,
    manifest: Option<&Manifest>,
) -> Result<ParsedLockfile> {
    LockfileDispatcher::new().parse_bytes(input, type_or_file_name, manifest)
}
