//! Directory creation with optional ancestor creation and a mode fix-up.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::perm::set_permission_with_report;
use crate::report::ReportOperationBuilder;
use crate::spec::{FileTreeError, SpecCreateDirectoryOptions};

/// Create `path` as a directory with `spec_mkdir_options.mode`.
///
/// An existing directory is left untouched. With `if_recursive`, missing
/// ancestors are created first using the same mode. Each new directory
/// gets an explicit mode change afterwards, so the process umask does
/// not decide the final bits.
///
/// Race policy: if `create_dir` fails but `path` is a directory right
/// after, another actor created it first and the failure is ignored.
/// This masks the race instead of resolving it atomically.
pub fn create_directory<P>(
    path: P,
    spec_mkdir_options: SpecCreateDirectoryOptions,
) -> Result<(), FileTreeError>
where
    P: AsRef<Path>,
{
    create_directory_with_report(
        path.as_ref(),
        spec_mkdir_options,
        &mut ReportOperationBuilder::default(),
    )
}

pub(crate) fn create_directory_with_report(
    path: &Path,
    spec_mkdir_options: SpecCreateDirectoryOptions,
    builder_report: &mut ReportOperationBuilder,
) -> Result<(), FileTreeError> {
    if path.is_dir() {
        return Ok(());
    }

    if spec_mkdir_options.if_recursive
        && let Some(path_parent) = path.parent()
        && !path_parent.as_os_str().is_empty()
        && path_parent != path
        && !path_parent.is_dir()
    {
        create_directory_with_report(path_parent, spec_mkdir_options, builder_report)?;
    }

    match fs::create_dir(path) {
        Ok(()) => {
            debug!(path = %path.display(), mode = %spec_mkdir_options.mode, "directory created");
            builder_report.add_dir();
        }
        Err(e) if path.is_dir() => {
            debug!(path = %path.display(), error = %e, "directory appeared concurrently");
        }
        Err(e) => {
            return Err(FileTreeError::MkdirFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }
    }

    set_permission_with_report(path, spec_mkdir_options.mode, builder_report)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::create_directory;
    use crate::spec::{EnumFileTreeErrorKind, Permission, SpecCreateDirectoryOptions};

    #[cfg(unix)]
    fn read_mode(path: &std::path::Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).expect("meta").permissions().mode() & 0o7777
    }

    #[test]
    fn create_directory_existing_is_noop() {
        let tmp = TempDir::new().expect("tempdir");
        create_directory(tmp.path(), SpecCreateDirectoryOptions::default()).expect("existing");
        assert!(tmp.path().is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn create_directory_is_idempotent_with_same_mode() {
        let tmp = TempDir::new().expect("tempdir");
        let path_dir = tmp.path().join("once");
        let spec_mkdir_options = SpecCreateDirectoryOptions {
            mode: Permission::from(0o750_u32),
            ..SpecCreateDirectoryOptions::default()
        };

        create_directory(&path_dir, spec_mkdir_options).expect("first");
        create_directory(&path_dir, spec_mkdir_options).expect("second");
        assert_eq!(read_mode(&path_dir), 0o750);
    }

    #[cfg(unix)]
    #[test]
    fn create_directory_recursive_creates_every_ancestor_with_mode() {
        let tmp = TempDir::new().expect("tempdir");
        let path_leaf = tmp.path().join("a/b/c/d");
        let spec_mkdir_options = SpecCreateDirectoryOptions {
            mode: Permission::from(0o751_u32),
            if_recursive: true,
        };

        create_directory(&path_leaf, spec_mkdir_options).expect("deep mkdir");
        for rel in ["a", "a/b", "a/b/c", "a/b/c/d"] {
            let path_dir = tmp.path().join(rel);
            assert!(path_dir.is_dir(), "{rel} missing");
            assert_eq!(read_mode(&path_dir), 0o751, "{rel} mode");
        }
    }

    #[cfg(unix)]
    #[test]
    fn create_directory_ignores_umask() {
        let tmp = TempDir::new().expect("tempdir");
        let path_dir = tmp.path().join("wide");
        let spec_mkdir_options = SpecCreateDirectoryOptions {
            mode: Permission::from(0o777_u32),
            ..SpecCreateDirectoryOptions::default()
        };

        create_directory(&path_dir, spec_mkdir_options).expect("mkdir");
        assert_eq!(read_mode(&path_dir), 0o777);
    }

    #[test]
    fn create_directory_non_recursive_missing_parent_fails() {
        let tmp = TempDir::new().expect("tempdir");
        let spec_mkdir_options = SpecCreateDirectoryOptions {
            if_recursive: false,
            ..SpecCreateDirectoryOptions::default()
        };

        let err = create_directory(tmp.path().join("no/parent"), spec_mkdir_options)
            .expect_err("must fail");
        assert_eq!(err.kind(), EnumFileTreeErrorKind::MkdirFailed);
        assert!(!tmp.path().join("no").exists());
    }

    #[test]
    fn create_directory_over_file_fails_in_ancestor() {
        let tmp = TempDir::new().expect("tempdir");
        let path_file = tmp.path().join("blocker");
        std::fs::write(&path_file, "x").expect("write");

        let err = create_directory(path_file.join("child"), SpecCreateDirectoryOptions::default())
            .expect_err("must fail");
        assert_eq!(err.kind(), EnumFileTreeErrorKind::MkdirFailed);
        assert!(err.to_string().contains("blocker"));
    }
}
