//! Recursive, fail-fast removal of files, links and directory trees.

use std::fs;
use std::path::Path;

use tracing::{debug, trace};

use crate::report::ReportOperationBuilder;
use crate::spec::FileTreeError;

/// Remove `path`: files and symlinks are unlinked (links never followed),
/// directories are emptied depth-first and then removed.
///
/// The first failing child aborts the walk and its error comes back
/// unchanged. A path that is none of file, link or directory yields
/// [`FileTreeError::NotFound`].
pub fn delete<P>(path: P) -> Result<(), FileTreeError>
where
    P: AsRef<Path>,
{
    delete_with_report(path.as_ref(), &mut ReportOperationBuilder::default())
}

pub(crate) fn delete_with_report(
    path: &Path,
    builder_report: &mut ReportOperationBuilder,
) -> Result<(), FileTreeError> {
    let cfg_file_type = match fs::symlink_metadata(path) {
        Ok(meta) => meta.file_type(),
        Err(_) => {
            return Err(FileTreeError::NotFound {
                path: path.to_path_buf(),
            });
        }
    };

    if cfg_file_type.is_file() || cfg_file_type.is_symlink() {
        fs::remove_file(path).map_err(|e| FileTreeError::DeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "entry removed");
        if cfg_file_type.is_symlink() {
            builder_report.add_symlink();
        } else {
            builder_report.add_file();
        }
        return Ok(());
    }

    if !cfg_file_type.is_dir() {
        return Err(FileTreeError::NotFound {
            path: path.to_path_buf(),
        });
    }

    delete_entries(path, builder_report)?;

    fs::remove_dir(path).map_err(|e| FileTreeError::RmdirFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), "directory removed");
    builder_report.add_dir();
    Ok(())
}

/// The `ReadDir` handle lives only in this frame, so every return path
/// releases it before the parent directory is removed.
fn delete_entries(
    path_dir: &Path,
    builder_report: &mut ReportOperationBuilder,
) -> Result<(), FileTreeError> {
    let to_err = |e: std::io::Error| FileTreeError::OpenDirFailed {
        path: path_dir.to_path_buf(),
        message: e.to_string(),
    };

    for entry_res in fs::read_dir(path_dir).map_err(to_err)? {
        let entry = entry_res.map_err(to_err)?;
        let path_entry = entry.path();
        trace!(path = %path_entry.display(), "deleting entry");
        delete_with_report(&path_entry, builder_report)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::delete;
    use crate::spec::EnumFileTreeErrorKind;

    fn write_text(path: &Path, txt: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, txt).expect("write text");
    }

    #[test]
    fn delete_single_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path_file = tmp.path().join("f.txt");
        write_text(&path_file, "x");

        delete(&path_file).expect("delete");
        assert!(!path_file.exists());
    }

    #[test]
    fn delete_removes_nested_tree() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("root");
        write_text(&root.join("a.txt"), "a");
        write_text(&root.join("sub/b.txt"), "b");
        write_text(&root.join("sub/deeper/c.txt"), "c");
        std::fs::create_dir_all(root.join("empty")).expect("mkdir empty");

        delete(&root).expect("delete tree");
        assert!(std::fs::symlink_metadata(&root).is_err());
        assert!(tmp.path().is_dir());
    }

    #[test]
    fn delete_missing_path_is_not_found() {
        let tmp = TempDir::new().expect("tempdir");
        let err = delete(tmp.path().join("missing")).expect_err("must fail");
        assert_eq!(err.kind(), EnumFileTreeErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn delete_does_not_follow_symlinks() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().expect("tempdir");
        let outside = tmp.path().join("outside");
        write_text(&outside.join("keep.txt"), "keep");
        let root = tmp.path().join("root");
        std::fs::create_dir_all(&root).expect("mkdir root");
        symlink(&outside, root.join("to_outside")).expect("symlink dir");
        symlink(tmp.path().join("nowhere"), root.join("dangling")).expect("symlink dangling");

        delete(&root).expect("delete tree");
        assert!(!root.exists());
        assert_eq!(
            std::fs::read_to_string(outside.join("keep.txt")).expect("read"),
            "keep"
        );
    }

    #[cfg(unix)]
    #[test]
    fn delete_fails_fast_on_unreadable_subdirectory() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("root");
        let locked = root.join("locked");
        write_text(&locked.join("inner.txt"), "x");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000))
            .expect("lock dir");

        // root can bypass permission bits; nothing to assert there.
        if std::fs::read_dir(&locked).is_ok() {
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755))
                .expect("unlock dir");
            return;
        }

        let err = delete(&root).expect_err("must fail");
        assert_eq!(err.kind(), EnumFileTreeErrorKind::OpenDirFailed);
        assert!(err.to_string().contains("locked"));
        assert!(root.is_dir());

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755))
            .expect("unlock dir");
    }
}
