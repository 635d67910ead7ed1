//! Error-mode front end over the four tree operations.

use std::path::Path;

use tracing::warn;

use crate::copy::copy_with_report;
use crate::delete::delete_with_report;
use crate::mkdir::create_directory_with_report;
use crate::perm::set_permission_with_report;
use crate::report::{ReportOperation, ReportOperationBuilder};
use crate::spec::{
    EnumErrorMode, FileTreeError, Permission, SpecCopyOptions, SpecCreateDirectoryOptions,
};

/// Runs `set_permission` / `create_directory` / `delete` / `copy` and
/// reports failures according to its [`EnumErrorMode`].
///
/// In [`EnumErrorMode::Raise`] a failure is `Err(e)`. In
/// [`EnumErrorMode::ReturnFalse`] it is `Ok(report)` with
/// `report.if_success == false` and `report.error == Some(e)`; counters
/// cover the work done before the failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTreeOperator {
    rule_error: EnumErrorMode,
}

impl FileTreeOperator {
    pub fn new(rule_error: EnumErrorMode) -> Self {
        Self { rule_error }
    }

    pub fn error_mode(&self) -> EnumErrorMode {
        self.rule_error
    }

    pub fn set_permission<P, M>(&self, path: P, mode: M) -> Result<ReportOperation, FileTreeError>
    where
        P: AsRef<Path>,
        M: Into<Permission>,
    {
        let mut builder_report = ReportOperationBuilder::default();
        let res_op = set_permission_with_report(path.as_ref(), mode.into(), &mut builder_report);
        self.finish(builder_report, res_op)
    }

    pub fn create_directory<P>(
        &self,
        path: P,
        spec_mkdir_options: SpecCreateDirectoryOptions,
    ) -> Result<ReportOperation, FileTreeError>
    where
        P: AsRef<Path>,
    {
        let mut builder_report = ReportOperationBuilder::default();
        let res_op =
            create_directory_with_report(path.as_ref(), spec_mkdir_options, &mut builder_report);
        self.finish(builder_report, res_op)
    }

    pub fn delete<P>(&self, path: P) -> Result<ReportOperation, FileTreeError>
    where
        P: AsRef<Path>,
    {
        let mut builder_report = ReportOperationBuilder::default();
        let res_op = delete_with_report(path.as_ref(), &mut builder_report);
        self.finish(builder_report, res_op)
    }

    pub fn copy<P, Q>(
        &self,
        source: P,
        dest: Q,
        spec_cp_options: SpecCopyOptions,
    ) -> Result<ReportOperation, FileTreeError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let mut builder_report = ReportOperationBuilder::default();
        let res_op = copy_with_report(
            source.as_ref(),
            dest.as_ref(),
            spec_cp_options,
            &mut builder_report,
        );
        self.finish(builder_report, res_op)
    }

    fn finish(
        &self,
        builder_report: ReportOperationBuilder,
        res_op: Result<(), FileTreeError>,
    ) -> Result<ReportOperation, FileTreeError> {
        match (res_op, self.rule_error) {
            (Err(e), EnumErrorMode::Raise) => Err(e),
            (Err(e), EnumErrorMode::ReturnFalse) => {
                warn!(error = %e, "operation failed");
                Ok(builder_report.build(Err(e)))
            }
            (Ok(()), _) => Ok(builder_report.build(Ok(()))),
        }
    }
}
