//! Permission changes on existing files and directories.

use std::path::Path;

use tracing::debug;

use crate::report::ReportOperationBuilder;
use crate::spec::{FileTreeError, Permission};
use crate::util::apply_mode;

/// Apply `mode` to an existing file or directory.
///
/// Integer modes pass through `From<u32>` and keep only their low 12
/// bits; parse strings or use [`Permission::new`] for a checked value.
/// Symlinks are followed; a dangling link is reported as
/// [`FileTreeError::NotFound`]. A failed mode change is
/// [`FileTreeError::PermissionChangeFailed`].
pub fn set_permission<P, M>(path: P, mode: M) -> Result<(), FileTreeError>
where
    P: AsRef<Path>,
    M: Into<Permission>,
{
    set_permission_with_report(path.as_ref(), mode.into(), &mut ReportOperationBuilder::default())
}

pub(crate) fn set_permission_with_report(
    path: &Path,
    mode: Permission,
    builder_report: &mut ReportOperationBuilder,
) -> Result<(), FileTreeError> {
    if !(path.is_file() || path.is_dir()) {
        return Err(FileTreeError::NotFound {
            path: path.to_path_buf(),
        });
    }

    apply_mode(path, mode).map_err(|e| FileTreeError::PermissionChangeFailed {
        path: path.to_path_buf(),
        mode,
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), %mode, "permission applied");
    builder_report.add_permission();
    Ok(())
}
