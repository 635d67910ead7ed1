//! `filehelper_io_fs` v1:
//! Recursive filesystem helpers: copy, delete, directory creation and
//! permission changes.
//!
//! Module layout:
//! - `copy`     : recursive copy (files, symlinks, directory trees)
//! - `delete`   : recursive fail-fast removal
//! - `mkdir`    : directory creation with ancestor creation + mode fix-up
//! - `perm`     : permission changes
//! - `operator` : error-mode front end returning [`ReportOperation`]
//! - `spec`     : enums/options/permission/errors
//! - `report`   : operation outcome model
//! - `util`     : shared helper functions

pub mod copy;
pub mod delete;
pub mod mkdir;
pub mod operator;
pub mod perm;
pub mod report;
pub mod spec;
mod util;

pub use copy::copy;
pub use delete::delete;
pub use mkdir::create_directory;
pub use operator::FileTreeOperator;
pub use perm::set_permission;
pub use report::{ReportOperation, ReportOperationBuilder};
pub use spec::{
    EnumErrorMode, EnumFileTreeErrorKind, FileTreeError, Permission, SpecCopyOptions,
    SpecCreateDirectoryOptions,
};
