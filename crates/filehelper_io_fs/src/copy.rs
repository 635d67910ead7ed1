//! Recursive copy of files, symlinks and directory trees.

use std::fs;
use std::path::Path;

use tracing::{debug, trace};

use crate::mkdir::create_directory_with_report;
use crate::report::ReportOperationBuilder;
use crate::spec::{FileTreeError, SpecCopyOptions, SpecCreateDirectoryOptions};
use crate::util::{
    copy_file_contents, create_symbolic_link, derive_parent_dir, is_overlap, is_same_file,
};

/// Copy `source` to `dest`, dispatching on the type of `source`:
///
/// - symlink: a new link at `dest` with the same target string;
/// - regular file: `dest`'s parent is created if needed, then a byte copy;
/// - directory: `dest` is created if missing, then each entry is copied
///   recursively in OS enumeration order.
///
/// Directories created along the way get `spec_cp_options.permissions`.
/// Copying a directory into itself or a descendant is rejected up front.
/// The first failure stops the walk and is returned unchanged.
pub fn copy<P, Q>(source: P, dest: Q, spec_cp_options: SpecCopyOptions) -> Result<(), FileTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    copy_with_report(
        source.as_ref(),
        dest.as_ref(),
        spec_cp_options,
        &mut ReportOperationBuilder::default(),
    )
}

pub(crate) fn copy_with_report(
    path_src: &Path,
    path_dst: &Path,
    spec_cp_options: SpecCopyOptions,
    builder_report: &mut ReportOperationBuilder,
) -> Result<(), FileTreeError> {
    if path_src.is_dir() && !path_src.is_symlink() && is_overlap(path_src, path_dst) {
        return Err(FileTreeError::SourceDestinationOverlap {
            source_path: path_src.to_path_buf(),
            destination: path_dst.to_path_buf(),
        });
    }
    copy_entry(path_src, path_dst, spec_cp_options, builder_report)
}

fn copy_entry(
    path_src: &Path,
    path_dst: &Path,
    spec_cp_options: SpecCopyOptions,
    builder_report: &mut ReportOperationBuilder,
) -> Result<(), FileTreeError> {
    let Ok(meta_src) = fs::symlink_metadata(path_src) else {
        return Err(FileTreeError::SourceNotFound {
            path: path_src.to_path_buf(),
        });
    };
    let cfg_file_type = meta_src.file_type();

    if cfg_file_type.is_symlink() {
        create_symbolic_link(path_src, path_dst)?;
        debug!(src = %path_src.display(), dst = %path_dst.display(), "symlink recreated");
        builder_report.add_symlink();
        return Ok(());
    }

    let spec_mkdir_options = SpecCreateDirectoryOptions {
        mode: spec_cp_options.permissions,
        if_recursive: true,
    };

    if cfg_file_type.is_file() {
        let path_parent_dst = derive_parent_dir(path_dst).ok_or_else(|| {
            FileTreeError::DirnameError {
                path: path_dst.to_path_buf(),
            }
        })?;
        if is_same_file(path_src, path_dst) {
            return Err(FileTreeError::CopyFailed {
                source_path: path_src.to_path_buf(),
                destination: path_dst.to_path_buf(),
                message: "source and destination are the same file".to_string(),
            });
        }
        create_directory_with_report(path_parent_dst, spec_mkdir_options, builder_report)?;

        copy_file_contents(path_src, path_dst, spec_cp_options.if_preserve_metadata).map_err(
            |e| FileTreeError::CopyFailed {
                source_path: path_src.to_path_buf(),
                destination: path_dst.to_path_buf(),
                message: e.to_string(),
            },
        )?;
        debug!(src = %path_src.display(), dst = %path_dst.display(), "file copied");
        builder_report.add_file();
        return Ok(());
    }

    if !cfg_file_type.is_dir() {
        return Err(FileTreeError::SourceNotFound {
            path: path_src.to_path_buf(),
        });
    }

    if !path_dst.is_dir() {
        create_directory_with_report(path_dst, spec_mkdir_options, builder_report)?;
    }
    copy_entries(path_src, path_dst, spec_cp_options, builder_report)
}

/// Walk one source directory; the `ReadDir` handle is dropped on every
/// return, including a failing child.
fn copy_entries(
    path_dir_src: &Path,
    path_dir_dst: &Path,
    spec_cp_options: SpecCopyOptions,
    builder_report: &mut ReportOperationBuilder,
) -> Result<(), FileTreeError> {
    let to_err = |e: std::io::Error| FileTreeError::OpenDirFailed {
        path: path_dir_src.to_path_buf(),
        message: e.to_string(),
    };

    for entry_res in fs::read_dir(path_dir_src).map_err(to_err)? {
        let entry = entry_res.map_err(to_err)?;
        let path_entry_src = entry.path();
        let path_entry_dst = path_dir_dst.join(entry.file_name());
        trace!(
            src = %path_entry_src.display(),
            dst = %path_entry_dst.display(),
            "copying entry"
        );
        copy_entry(&path_entry_src, &path_entry_dst, spec_cp_options, builder_report)?;
    }
    Ok(())
}
