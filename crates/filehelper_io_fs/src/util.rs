use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::spec::{FileTreeError, Permission};

////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _absolutize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// Canonicalize the deepest existing ancestor and re-append the rest, so
/// not-yet-created destinations still compare against resolved sources.
fn _normalize_path(path: &Path) -> PathBuf {
    let path_abs = _absolutize_path(path);
    let mut path_cursor = path_abs.as_path();
    let mut l_tail = Vec::new();
    loop {
        if let Ok(resolved) = fs::canonicalize(path_cursor) {
            return l_tail
                .iter()
                .rev()
                .fold(resolved, |acc: PathBuf, part| acc.join(part));
        }
        match (path_cursor.parent(), path_cursor.file_name()) {
            (Some(path_parent), Some(name)) => {
                l_tail.push(name.to_os_string());
                path_cursor = path_parent;
            }
            _ => return path_abs,
        }
    }
}

/// `true` when `dst` is `src` itself or lies somewhere beneath it.
pub(crate) fn is_overlap(src: &Path, dst: &Path) -> bool {
    _normalize_path(dst).starts_with(_normalize_path(src))
}

/// Parent directory a file copy must ensure; `None` when `path` has none.
///
/// A bare file name resolves to the current directory.
pub(crate) fn derive_parent_dir(path: &Path) -> Option<&Path> {
    match path.parent() {
        None => None,
        Some(path_parent) if path_parent.as_os_str().is_empty() => Some(Path::new(".")),
        Some(path_parent) => Some(path_parent),
    }
}

/// `true` when `path_dst` already resolves to the same file as `path_src`
/// (same path, a symlink to it, or a hard link).
pub(crate) fn is_same_file(path_src: &Path, path_dst: &Path) -> bool {
    let (Ok(meta_src), Ok(meta_dst)) = (fs::metadata(path_src), fs::metadata(path_dst)) else {
        return false;
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        (meta_src.dev(), meta_src.ino()) == (meta_dst.dev(), meta_dst.ino())
    }
    #[cfg(not(unix))]
    {
        let _ = (meta_src, meta_dst);
        matches!(
            (fs::canonicalize(path_src), fs::canonicalize(path_dst)),
            (Ok(a), Ok(b)) if a == b
        )
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PlatformOps

#[cfg(unix)]
pub(crate) fn apply_mode(path: &Path, mode: Permission) -> Result<(), io::Error> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode.mode()))
}

/// Without unix modes only the owner-write bit survives, as the read-only flag.
#[cfg(not(unix))]
pub(crate) fn apply_mode(path: &Path, mode: Permission) -> Result<(), io::Error> {
    let mut perm = fs::metadata(path)?.permissions();
    perm.set_readonly(mode.mode() & 0o200 == 0);
    fs::set_permissions(path, perm)
}

pub(crate) fn create_symbolic_link(path_src: &Path, path_dst: &Path) -> Result<(), FileTreeError> {
    let to_err = |e: io::Error| FileTreeError::SymlinkFailed {
        source_path: path_src.to_path_buf(),
        destination: path_dst.to_path_buf(),
        message: e.to_string(),
    };
    let target = fs::read_link(path_src).map_err(to_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::symlink;
        symlink(&target, path_dst).map_err(to_err)
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::{symlink_dir, symlink_file};
        let res = if path_src.is_dir() {
            symlink_dir(&target, path_dst)
        } else {
            symlink_file(&target, path_dst)
        };
        res.map_err(to_err)
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = target;
        Err(FileTreeError::SymlinkFailed {
            source_path: path_src.to_path_buf(),
            destination: path_dst.to_path_buf(),
            message: "Symbolic links are unsupported on this platform".to_string(),
        })
    }
}

pub(crate) fn copy_file_contents(
    path_file_src: &Path,
    path_file_dst: &Path,
    if_preserve_metadata: bool,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;
    if if_preserve_metadata {
        apply_metadata(path_file_src, path_file_dst)?;
    }
    Ok(())
}

fn apply_metadata(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    #[cfg(target_os = "linux")]
    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = %path_file_src.display(), error = %e, "xattr listing skipped");
            return;
        }
    };

    for name in iter_xattr_names {
        let raw_value = match xattr::get(path_file_src, &name) {
            Ok(Some(v)) => v,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(
                    path = %path_file_src.display(),
                    name = %name.to_string_lossy(),
                    error = %e,
                    "xattr read skipped"
                );
                continue;
            }
        };
        if let Err(e) = xattr::set(path_file_dst, &name, &raw_value) {
            tracing::warn!(
                path = %path_file_dst.display(),
                name = %name.to_string_lossy(),
                error = %e,
                "xattr copy skipped"
            );
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::{derive_parent_dir, is_overlap, is_same_file};

    #[test]
    fn derive_parent_dir_handles_bare_names_and_root() {
        assert_eq!(derive_parent_dir(Path::new("a/b.txt")), Some(Path::new("a")));
        assert_eq!(derive_parent_dir(Path::new("b.txt")), Some(Path::new(".")));
        assert_eq!(derive_parent_dir(Path::new("/")), None);
        assert_eq!(derive_parent_dir(Path::new("")), None);
    }

    #[test]
    fn overlap_detects_self_and_descendant_destinations() {
        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).expect("mkdir src");

        assert!(is_overlap(&src, &src));
        assert!(is_overlap(&src, &src.join("nested/deeper")));
        assert!(!is_overlap(&src, &tmp.path().join("dst")));
        assert!(!is_overlap(&src, &tmp.path().join("src_sibling")));
    }

    #[cfg(unix)]
    #[test]
    fn same_file_detects_identical_paths_and_links() {
        let tmp = TempDir::new().expect("tempdir");
        let path_file = tmp.path().join("a.txt");
        let path_other = tmp.path().join("b.txt");
        std::fs::write(&path_file, "a").expect("write");
        std::fs::write(&path_other, "a").expect("write");
        std::fs::hard_link(&path_file, tmp.path().join("hard.txt")).expect("hard link");

        assert!(is_same_file(&path_file, &path_file));
        assert!(is_same_file(&path_file, &tmp.path().join("hard.txt")));
        assert!(!is_same_file(&path_file, &path_other));
        assert!(!is_same_file(&path_file, &tmp.path().join("missing.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn overlap_resolves_symlinked_destination_parent() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().expect("tempdir");
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).expect("mkdir src");
        symlink(&src, tmp.path().join("alias")).expect("symlink");

        assert!(is_overlap(&src, &tmp.path().join("alias/inner")));
    }
}
