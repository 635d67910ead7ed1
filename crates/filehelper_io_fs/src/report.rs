//! Operation outcome model and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

use crate::spec::FileTreeError;

/// Outcome of one `FileTreeOperator` call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportOperation {
    /// `true` when the requested end state was reached.
    pub if_success: bool,
    /// Failure that stopped the call (`ReturnFalse` mode only).
    pub error: Option<FileTreeError>,
    /// Regular files copied or removed.
    pub cnt_files: u64,
    /// Directories created or removed.
    pub cnt_dirs: u64,
    /// Symbolic links recreated or removed.
    pub cnt_symlinks: u64,
    /// Mode changes applied.
    pub cnt_permissions: u64,
}

impl ReportOperation {
    /// Error text of the failure, if any.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_files".to_string(), self.cnt_files);
        dict_counts.insert("cnt_dirs".to_string(), self.cnt_dirs);
        dict_counts.insert("cnt_symlinks".to_string(), self.cnt_symlinks);
        dict_counts.insert("cnt_permissions".to_string(), self.cnt_permissions);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let c_status = if self.if_success { "ok" } else { "failed" };
        let mut txt = format!(
            "{prefix} {c_status} files={} dirs={} symlinks={} permissions={}",
            self.cnt_files, self.cnt_dirs, self.cnt_symlinks, self.cnt_permissions
        );
        if let Some(error) = &self.error {
            txt.push_str(&format!(" error={error}"));
        }
        txt
    }
}

impl fmt::Display for ReportOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[FS]"))
    }
}

/// Mutable accumulator threaded through one traversal.
#[derive(Debug, Default, Clone)]
pub struct ReportOperationBuilder {
    /// See [`ReportOperation::cnt_files`].
    pub cnt_files: u64,
    /// See [`ReportOperation::cnt_dirs`].
    pub cnt_dirs: u64,
    /// See [`ReportOperation::cnt_symlinks`].
    pub cnt_symlinks: u64,
    /// See [`ReportOperation::cnt_permissions`].
    pub cnt_permissions: u64,
}

impl ReportOperationBuilder {
    pub fn add_file(&mut self) {
        self.cnt_files += 1;
    }

    pub fn add_dir(&mut self) {
        self.cnt_dirs += 1;
    }

    pub fn add_symlink(&mut self) {
        self.cnt_symlinks += 1;
    }

    pub fn add_permission(&mut self) {
        self.cnt_permissions += 1;
    }

    /// Finalize into a report; `res_op` decides `if_success` and `error`.
    pub fn build(self, res_op: Result<(), FileTreeError>) -> ReportOperation {
        let (if_success, error) = match res_op {
            Ok(()) => (true, None),
            Err(e) => (false, Some(e)),
        };
        ReportOperation {
            if_success,
            error,
            cnt_files: self.cnt_files,
            cnt_dirs: self.cnt_dirs,
            cnt_symlinks: self.cnt_symlinks,
            cnt_permissions: self.cnt_permissions,
        }
    }
}
