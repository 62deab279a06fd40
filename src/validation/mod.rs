//! Manifest validation.
//!
//! Decoding never fails, so this is where every defect of a manifest is
//! surfaced. Checks cover:
//! - Field presence (class table, image directory, required sample fields)
//! - Class table consistency (equal lengths, unique ids and names)
//! - Sample uniqueness (file name ignoring case, plus id)
//! - Per-sample array cardinality (parallel geometry arrays agree)
//!
//! Validation collects every violation instead of stopping at the first.

pub mod duplicates;
mod report;

pub use duplicates::{duplicate_indices, find_duplicates, SampleKey};
pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::HashSet;

use crate::manifest::{Manifest, ManifestHeader, SampleRecord};

/// Validates a manifest and returns a report of all issues found.
pub fn validate_manifest<M: Manifest>(manifest: &M) -> ValidationReport {
    let mut report = ValidationReport::new();
    let header = manifest.header();

    // presence checks come before consistency checks
    validate_required(header, &mut report);
    if manifest.samples().is_none() {
        report.error(
            IssueCode::MissingSamples,
            "samples is missing",
            IssueContext::Manifest,
        );
    }
    manifest.check_extra(&mut report);

    validate_class_table(header, &mut report);
    if let Some(samples) = manifest.samples() {
        validate_samples(samples, header.class_ids.as_deref(), &mut report);
    }

    report
}

/// Checks that the class table and image directory are present.
fn validate_required(header: &ManifestHeader, report: &mut ValidationReport) {
    if header.class_ids.is_none() {
        report.error(
            IssueCode::MissingClassIds,
            "class_ids is missing",
            IssueContext::Manifest,
        );
    }
    if is_blank(header.image_dir.as_deref()) {
        report.error(
            IssueCode::MissingImageDir,
            "image_dir is missing or blank",
            IssueContext::Manifest,
        );
    }
    if header.class_names.is_none() {
        report.error(
            IssueCode::MissingClassNames,
            "class_names is missing",
            IssueContext::Manifest,
        );
    }
}

/// Checks that ids and names pair up and are unique.
fn validate_class_table(header: &ManifestHeader, report: &mut ValidationReport) {
    if let (Some(ids), Some(names)) = (&header.class_ids, &header.class_names) {
        if ids.len() != names.len() {
            report.error(
                IssueCode::ClassCountMismatch,
                format!(
                    "class_ids and class_names differ in length ({} vs {})",
                    ids.len(),
                    names.len()
                ),
                IssueContext::Manifest,
            );
        }
    }

    if let Some(ids) = &header.class_ids {
        for index in duplicate_indices(ids, |id| *id) {
            report.error(
                IssueCode::DuplicateClassId,
                format!("duplicate class id {}", ids[index]),
                IssueContext::Class { index },
            );
        }
    }

    if let Some(names) = &header.class_names {
        for index in duplicate_indices(names, |name| name.clone()) {
            report.error(
                IssueCode::DuplicateClassName,
                format!("duplicate class name '{}'", names[index]),
                IssueContext::Class { index },
            );
        }
    }
}

/// Validates sample identity, required fields and label references.
fn validate_samples<S: SampleRecord>(
    samples: &[S],
    class_ids: Option<&[i64]>,
    report: &mut ValidationReport,
) {
    let key = |s: &S| SampleKey::new(s.file_name(), s.id());

    for index in duplicate_indices(samples, key) {
        let sample = &samples[index];
        report.error(
            IssueCode::DuplicateSample,
            describe_duplicate(sample),
            sample_context(index, sample),
        );
    }

    for (index, sample) in samples.iter().enumerate() {
        sample.check(&sample_context(index, sample), report);
    }

    // Labels are only checked against a class table that exists
    let Some(class_ids) = class_ids else {
        return;
    };
    let known: HashSet<i64> = class_ids.iter().copied().collect();

    for (index, sample) in samples.iter().enumerate() {
        let mut reported = HashSet::new();
        for label in sample.label_ids() {
            if !known.contains(&label) && reported.insert(label) {
                report.warning(
                    IssueCode::UnknownLabelId,
                    format!("label id {} is not one of class_ids", label),
                    sample_context(index, sample),
                );
            }
        }
    }
}

fn describe_duplicate<S: SampleRecord>(sample: &S) -> String {
    let name = sample.file_name().unwrap_or("<no file name>");
    match sample.id() {
        Some(id) => format!("duplicate sample '{}' with id {}", name, id),
        None => format!("duplicate sample '{}' without id", name),
    }
}

fn sample_context<S: SampleRecord>(index: usize, sample: &S) -> IssueContext {
    IssueContext::Sample {
        index,
        id: sample.id(),
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Reports `field` as missing unless `present`.
pub fn require(report: &mut ValidationReport, context: &IssueContext, field: &str, present: bool) {
    if !present {
        report.error(
            IssueCode::MissingSampleField,
            format!("{} is missing", field),
            context.clone(),
        );
    }
}

/// Reports `field` as missing unless it holds non-whitespace text.
pub fn require_text(
    report: &mut ValidationReport,
    context: &IssueContext,
    field: &str,
    value: Option<&str>,
) {
    if is_blank(value) {
        report.error(
            IssueCode::MissingSampleField,
            format!("{} is missing or blank", field),
            context.clone(),
        );
    }
}

/// Compares the length of each present array in `others` with `anchor`.
///
/// Absent arrays are skipped; their absence is reported by [`require`].
pub fn require_same_lengths(
    report: &mut ValidationReport,
    context: &IssueContext,
    anchor: (&str, Option<usize>),
    others: &[(&str, Option<usize>)],
) {
    let (anchor_name, Some(anchor_len)) = anchor else {
        return;
    };

    for &(name, len) in others {
        match len {
            Some(len) if len != anchor_len => report.error(
                IssueCode::LengthMismatch,
                format!(
                    "{} and {} differ in length ({} vs {})",
                    anchor_name, name, anchor_len, len
                ),
                context.clone(),
            ),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::manifest::{ClassificationManifest, ClassificationSample, Manifest};

    fn manifest() -> ClassificationManifest {
        ClassificationManifest {
            header: ManifestHeader::new(
                vec![0, 1, 2],
                vec!["cat".into(), "dog".into(), "bird".into()],
                "/data/pets",
            ),
            samples: Some(vec![
                ClassificationSample::new(1, "a.png", 0),
                ClassificationSample::new(2, "b.png", 2),
            ]),
        }
    }

    #[test]
    fn test_duplicate_class_id() {
        let mut m = manifest();
        m.header.class_ids = Some(vec![0, 1, 0]);
        let report = m.validate();
        assert_eq!(report.messages(), vec!["class #2: duplicate class id 0"]);
        assert_eq!(report.count(IssueCode::DuplicateClassId), 1);
    }

    #[test]
    fn test_duplicate_class_name() {
        let mut m = manifest();
        m.header.class_names = Some(vec!["cat".into(), "dog".into(), "dog".into()]);
        let report = m.validate();
        assert_eq!(report.messages(), vec!["class #2: duplicate class name 'dog'"]);
        assert_eq!(report.count(IssueCode::DuplicateClassName), 1);
    }

    #[test]
    fn test_blank_and_absent_image_dir() {
        for image_dir in [None, Some(String::new()), Some(" \t".to_string())] {
            let mut m = manifest();
            m.header.image_dir = image_dir;
            let report = m.validate();
            assert_eq!(report.messages(), vec!["manifest: image_dir is missing or blank"]);
            assert_eq!(report.count(IssueCode::MissingImageDir), 1);
        }
    }

    #[test]
    fn test_class_count_mismatch() {
        let mut m = manifest();
        m.header.class_ids = Some(vec![0, 2]);
        let report = m.validate();
        assert_eq!(
            report.messages(),
            vec!["manifest: class_ids and class_names differ in length (2 vs 3)"]
        );
        assert_eq!(report.count(IssueCode::ClassCountMismatch), 1);
    }

    #[test]
    fn test_missing_samples_only() {
        let mut m = manifest();
        m.samples = None;
        let report = m.validate();
        assert_eq!(report.messages(), vec!["manifest: samples is missing"]);
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn test_presence_checks_precede_class_table_checks() {
        let mut m = manifest();
        m.header.class_ids = Some(vec![0, 0]);
        m.samples = None;
        let report = m.validate();
        assert_eq!(
            report.messages(),
            vec![
                "manifest: samples is missing",
                "manifest: class_ids and class_names differ in length (2 vs 3)",
                "class #1: duplicate class id 0",
            ]
        );
    }

    #[test]
    fn test_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some("  \t")));
        assert!(!is_blank(Some("images")));
    }

    #[test]
    fn test_require_same_lengths_skips_absent() {
        let mut report = ValidationReport::new();
        let ctx = IssueContext::Sample { index: 0, id: Some(1) };
        require_same_lengths(
            &mut report,
            &ctx,
            ("bbox_label_id", Some(2)),
            &[("bbox_row1", Some(2)), ("bbox_col1", None), ("bbox_row2", Some(1))],
        );
        assert_eq!(report.error_count(), 1);
        assert_eq!(
            report.messages(),
            vec!["sample #0 (id 1): bbox_label_id and bbox_row2 differ in length (2 vs 1)"]
        );
    }

    #[test]
    fn test_require_same_lengths_without_anchor() {
        let mut report = ValidationReport::new();
        require_same_lengths(
            &mut report,
            &IssueContext::Manifest,
            ("mask", None),
            &[("bbox_row1", Some(3))],
        );
        assert!(report.is_clean());
    }
}
