//! Operation options, permission model and top-level error types.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Failure-reporting policy applied by [`crate::FileTreeOperator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumErrorMode {
    /// Return `Err(FileTreeError)`; the caller's `?` aborts the call chain.
    #[default]
    Raise,
    /// Return `Ok(report)` with `if_success = false` and the error attached.
    ReturnFalse,
}

/// Discriminant of [`FileTreeError`] for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumFileTreeErrorKind {
    NotFound,
    InvalidPermission,
    PermissionChangeFailed,
    MkdirFailed,
    DeleteFailed,
    OpenDirFailed,
    CloseDirFailed,
    RmdirFailed,
    SymlinkFailed,
    CopyFailed,
    DirnameError,
    SourceNotFound,
    SourceDestinationOverlap,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Permission

/// Mask of meaningful mode bits (setuid/setgid/sticky + rwx triplets).
const N_PERMISSION_MASK: u32 = 0o7777;

/// Numeric file mode, accepted as an integer or an octal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission(u32);

impl Permission {
    /// Default mode for directories made by `create_directory`.
    pub const DIR_DEFAULT: Self = Self(0o775);
    /// Default mode for directories made while copying.
    pub const COPY_DEFAULT: Self = Self(0o755);

    /// Build from a raw mode, rejecting bits outside `0o7777`.
    pub fn new(mode: u32) -> Result<Self, FileTreeError> {
        if mode & !N_PERMISSION_MASK != 0 {
            return Err(FileTreeError::InvalidPermission {
                value: format!("{mode:#o}"),
            });
        }
        Ok(Self(mode))
    }

    /// Raw mode bits.
    pub fn mode(self) -> u32 {
        self.0
    }
}

/// Integers keep only their low 12 bits, so a raw `st_mode` such as
/// `0o100644` becomes `0o644`. Use [`Permission::new`] to reject
/// out-of-range values instead, as string parsing does.
impl From<u32> for Permission {
    fn from(mode: u32) -> Self {
        Self(mode & N_PERMISSION_MASK)
    }
}

/// Parses `"0755"`, `"755"` or `"0o755"` in base 8.
impl FromStr for Permission {
    type Err = FileTreeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let c_trimmed = value.trim();
        let c_digits = c_trimmed
            .strip_prefix("0o")
            .or_else(|| c_trimmed.strip_prefix("0O"))
            .unwrap_or(c_trimmed);
        if c_digits.is_empty() {
            return Err(FileTreeError::InvalidPermission {
                value: value.to_string(),
            });
        }
        let mode = u32::from_str_radix(c_digits, 8).map_err(|_| {
            FileTreeError::InvalidPermission {
                value: value.to_string(),
            }
        })?;
        Self::new(mode).map_err(|_| FileTreeError::InvalidPermission {
            value: value.to_string(),
        })
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#o}", self.0)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `create_directory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecCreateDirectoryOptions {
    /// Mode applied to every directory this call creates.
    pub mode: Permission,
    /// Create missing ancestors first.
    pub if_recursive: bool,
}

impl Default for SpecCreateDirectoryOptions {
    fn default() -> Self {
        Self {
            mode: Permission::DIR_DEFAULT,
            if_recursive: true,
        }
    }
}

/// Input options for `copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecCopyOptions {
    /// Mode for destination directories created along the way.
    pub permissions: Permission,
    /// Carry source mode bits, timestamps and (Linux) xattrs onto copied files.
    pub if_preserve_metadata: bool,
}

impl Default for SpecCopyOptions {
    fn default() -> Self {
        Self {
            permissions: Permission::COPY_DEFAULT,
            if_preserve_metadata: false,
        }
    }
}

/// Failure of one filesystem operation, with the offending path(s).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileTreeError {
    #[error("{} path not found.", .path.display())]
    NotFound { path: PathBuf },

    #[error("Invalid permission value: `{value}` (expected octal mode <= 0o7777)")]
    InvalidPermission { value: String },

    #[error("{} chmod {mode} error: {message}", .path.display())]
    PermissionChangeFailed {
        path: PathBuf,
        mode: Permission,
        message: String,
    },

    #[error("Failed to create directory \"{}\": {message}", .path.display())]
    MkdirFailed { path: PathBuf, message: String },

    #[error("Can't delete: {} ({message})", .path.display())]
    DeleteFailed { path: PathBuf, message: String },

    #[error("Can't open dir: {} ({message})", .path.display())]
    OpenDirFailed { path: PathBuf, message: String },

    #[error("Can't close directory: {} ({message})", .path.display())]
    CloseDirFailed { path: PathBuf, message: String },

    #[error("Can't remove directory: {} ({message})", .path.display())]
    RmdirFailed { path: PathBuf, message: String },

    #[error("{} to {} symlink error: {message}", .source_path.display(), .destination.display())]
    SymlinkFailed {
        source_path: PathBuf,
        destination: PathBuf,
        message: String,
    },

    #[error("{} to {} copy error: {message}", .source_path.display(), .destination.display())]
    CopyFailed {
        source_path: PathBuf,
        destination: PathBuf,
        message: String,
    },

    #[error("Can't get dirname: {}", .path.display())]
    DirnameError { path: PathBuf },

    #[error("Source not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    #[error(
        "Source and destination directories overlap: {} <-> {}",
        .source_path.display(),
        .destination.display()
    )]
    SourceDestinationOverlap {
        source_path: PathBuf,
        destination: PathBuf,
    },
}

impl FileTreeError {
    /// Variant discriminant.
    pub fn kind(&self) -> EnumFileTreeErrorKind {
        match self {
            Self::NotFound { .. } => EnumFileTreeErrorKind::NotFound,
            Self::InvalidPermission { .. } => EnumFileTreeErrorKind::InvalidPermission,
            Self::PermissionChangeFailed { .. } => EnumFileTreeErrorKind::PermissionChangeFailed,
            Self::MkdirFailed { .. } => EnumFileTreeErrorKind::MkdirFailed,
            Self::DeleteFailed { .. } => EnumFileTreeErrorKind::DeleteFailed,
            Self::OpenDirFailed { .. } => EnumFileTreeErrorKind::OpenDirFailed,
            Self::CloseDirFailed { .. } => EnumFileTreeErrorKind::CloseDirFailed,
            Self::RmdirFailed { .. } => EnumFileTreeErrorKind::RmdirFailed,
            Self::SymlinkFailed { .. } => EnumFileTreeErrorKind::SymlinkFailed,
            Self::CopyFailed { .. } => EnumFileTreeErrorKind::CopyFailed,
            Self::DirnameError { .. } => EnumFileTreeErrorKind::DirnameError,
            Self::SourceNotFound { .. } => EnumFileTreeErrorKind::SourceNotFound,
            Self::SourceDestinationOverlap { .. } => {
                EnumFileTreeErrorKind::SourceDestinationOverlap
            }
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
