//! Validation report types for structured error reporting.
//!
//! This module provides rich, structured validation results that can be
//! displayed to users, serialized for tooling, or processed programmatically.

use std::fmt;

use serde::Serialize;

/// The result of validating a manifest.
///
/// Contains all issues found during validation, in the order they were found.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    /// All issues found during validation.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Adds an issue to the report.
    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Shorthand for adding an error.
    pub fn error(&mut self, code: IssueCode, message: impl Into<String>, context: IssueContext) {
        self.add(ValidationIssue::error(code, message, context));
    }

    /// Shorthand for adding a warning.
    pub fn warning(&mut self, code: IssueCode, message: impl Into<String>, context: IssueContext) {
        self.add(ValidationIssue::warning(code, message, context));
    }

    /// Returns the number of errors in the report.
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    /// Returns the number of warnings in the report.
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Number of issues (of any severity) with the given code.
    pub fn count(&self, code: IssueCode) -> usize {
        self.issues.iter().filter(|i| i.code == code).count()
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Returns true if there are no issues at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// The error messages, one per violated invariant, in discovery order.
    pub fn messages(&self) -> Vec<String> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .map(|i| format!("{}: {}", i.context, i.message))
            .collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Validation completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single validation issue (error or warning).
#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    /// The severity of the issue.
    pub severity: Severity,

    /// A stable code for the issue type.
    pub code: IssueCode,

    /// A human-readable description of the issue.
    pub message: String,

    /// Where the issue occurred.
    pub context: IssueContext,
}

impl ValidationIssue {
    /// Creates a new validation issue.
    pub fn new(
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
        context: IssueContext,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context,
        }
    }

    /// Creates a new error.
    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Error, code, message, context)
    }

    /// Creates a new warning.
    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Warning, code, message, context)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

/// The severity of a validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Suspicious but loadable data.
    Warning,
    /// A violated invariant; the manifest cannot be loaded.
    Error,
}

/// A stable code identifying the type of validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    // Manifest-level fields
    /// `class_ids` is absent.
    MissingClassIds,
    /// `class_names` is absent.
    MissingClassNames,
    /// `image_dir` is absent or blank.
    MissingImageDir,
    /// `samples` is absent.
    MissingSamples,
    /// `segmentation_dir` is absent or blank.
    MissingSegmentationDir,

    // Class table
    /// `class_ids` and `class_names` have different lengths.
    ClassCountMismatch,
    /// A class id appears more than once.
    DuplicateClassId,
    /// A class name appears more than once.
    DuplicateClassName,
    /// `class_custom_data` is not aligned with `class_ids`.
    ClassCustomDataLength,

    // Samples
    /// Two samples share a file name (ignoring case) and id.
    DuplicateSample,
    /// A required sample field is absent or blank.
    MissingSampleField,
    /// Parallel per-sample arrays have different lengths.
    LengthMismatch,
    /// A sample label is not one of `class_ids`.
    UnknownLabelId,
}

/// Where a validation issue occurred.
#[derive(Clone, Debug, Serialize)]
pub enum IssueContext {
    /// The manifest as a whole.
    Manifest,
    /// A position in the class table.
    Class { index: usize },
    /// A sample, by position and (when present) id.
    Sample { index: usize, id: Option<i64> },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Manifest => write!(f, "manifest"),
            IssueContext::Class { index } => write!(f, "class #{}", index),
            IssueContext::Sample {
                index,
                id: Some(id),
            } => write!(f, "sample #{} (id {})", index, id),
            IssueContext::Sample { index, id: None } => write!(f, "sample #{}", index),
        }
    }
}
