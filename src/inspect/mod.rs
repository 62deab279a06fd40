//! Manifest inspection and statistics.
//!
//! This module analyzes a manifest and produces a structured report with
//! summary counts, the label distribution and box quality metrics.

mod report;

pub use report::{BoxStats, InspectReport, LabelCount, LabelsSection, SummarySection};

use std::collections::HashMap;

use crate::geometry::{AxisBox, OrientedBox};
use crate::manifest::{AnyManifest, Manifest, ManifestHeader, SampleRecord};

/// Options for manifest inspection.
#[derive(Clone, Debug)]
pub struct InspectOptions {
    /// Number of top labels to show in the histogram.
    pub top_labels: usize,
    /// Width of histogram bars (in characters).
    pub bar_width: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            top_labels: 10,
            bar_width: 20,
        }
    }
}

/// Inspect a manifest and produce a detailed report.
///
/// This analyzes the manifest to compute:
/// - Summary counts (classes, samples, objects)
/// - Label distribution histogram (top N classes)
/// - Box statistics for detection and instance segmentation manifests
pub fn inspect_manifest(manifest: &AnyManifest, opts: &InspectOptions) -> InspectReport {
    let (summary, labels, boxes) = match manifest {
        AnyManifest::Classification(m) => analyze(m, opts, |_| Vec::new()),
        AnyManifest::ObjectDetection(m) => analyze(m, opts, |s| {
            s.geometry()
                .map(|g| g.iter().map(|b| axis_extent(&b.bbox)).collect())
                .unwrap_or_default()
        }),
        AnyManifest::OrientedObjectDetection(m) => analyze(m, opts, |s| {
            s.geometry()
                .map(|g| g.iter().map(|b| oriented_extent(&b.obox)).collect())
                .unwrap_or_default()
        }),
        AnyManifest::InstanceSegmentation(m) => analyze(m, opts, |s| {
            s.geometry()
                .map(|g| g.iter().map(|o| axis_extent(&o.bbox)).collect())
                .unwrap_or_default()
        }),
        AnyManifest::SemanticSegmentation(m) => analyze(m, opts, |_| Vec::new()),
    };

    InspectReport {
        summary,
        labels,
        boxes,
        bar_width: opts.bar_width,
    }
}

/// The measurable part of a box: finiteness, ordering, and its two sides.
#[derive(Clone, Copy, Debug)]
struct Extent {
    finite: bool,
    ordered: bool,
    width: f64,
    height: f64,
}

fn axis_extent(bbox: &AxisBox) -> Extent {
    Extent {
        finite: bbox.is_finite(),
        ordered: bbox.is_ordered(),
        width: bbox.width(),
        height: bbox.height(),
    }
}

// Oriented boxes store half side lengths
fn oriented_extent(obox: &OrientedBox) -> Extent {
    Extent {
        finite: obox.is_finite(),
        ordered: obox.length1 >= 0.0 && obox.length2 >= 0.0,
        width: 2.0 * obox.length1,
        height: 2.0 * obox.length2,
    }
}

fn analyze<M: Manifest>(
    manifest: &M,
    opts: &InspectOptions,
    extents: impl Fn(&M::Sample) -> Vec<Extent>,
) -> (SummarySection, LabelsSection, BoxStats) {
    let samples = manifest.samples().unwrap_or_default();

    let summary = compute_summary(M::KIND.name(), manifest.header(), samples);
    let labels = compute_labels(manifest.header(), samples, opts.top_labels);
    let all_extents: Vec<Extent> = samples.iter().flat_map(|s| extents(s)).collect();
    let boxes = compute_box_stats(&all_extents);

    (summary, labels, boxes)
}

/// Compute summary section counts.
fn compute_summary<S: SampleRecord>(
    task: &str,
    header: &ManifestHeader,
    samples: &[S],
) -> SummarySection {
    SummarySection {
        task: task.to_string(),
        classes: header.class_ids.as_ref().map_or(0, Vec::len),
        samples: samples.len(),
        objects: samples.iter().map(SampleRecord::object_count).sum(),
        annotated_samples: samples.iter().filter(|s| s.object_count() > 0).count(),
    }
}

/// Compute label distribution histogram.
fn compute_labels<S: SampleRecord>(
    header: &ManifestHeader,
    samples: &[S],
    top_n: usize,
) -> LabelsSection {
    // Map class ids to names via the positional pairing
    let class_names: HashMap<i64, &str> = match (&header.class_ids, &header.class_names) {
        (Some(ids), Some(names)) => ids
            .iter()
            .copied()
            .zip(names.iter().map(String::as_str))
            .collect(),
        _ => HashMap::new(),
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut total_labels = 0;

    for sample in samples {
        for label_id in sample.label_ids() {
            let label = class_names
                .get(&label_id)
                .map(|name| name.to_string())
                .unwrap_or_else(|| format!("<unknown id {}>", label_id));
            *counts.entry(label).or_insert(0) += 1;
            total_labels += 1;
        }
    }

    // Sort by count descending, then by name ascending for deterministic output
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let total_distinct = sorted.len();
    let rest = sorted.split_off(top_n.min(sorted.len()));

    let entries: Vec<LabelCount> = sorted
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    let other_count: usize = rest.into_iter().map(|(_, count)| count).sum();

    LabelsSection {
        top_n,
        total_distinct,
        total_labels,
        entries,
        other_count,
    }
}

/// Compute box statistics.
fn compute_box_stats(extents: &[Extent]) -> BoxStats {
    let mut stats = BoxStats {
        total: extents.len(),
        ..Default::default()
    };

    let mut min_width: Option<f64> = None;
    let mut max_width: Option<f64> = None;
    let mut min_height: Option<f64> = None;
    let mut max_height: Option<f64> = None;

    for extent in extents.iter().filter(|e| e.finite) {
        stats.finite += 1;
        if !extent.ordered {
            continue;
        }
        stats.ordered += 1;

        let (width, height) = (extent.width, extent.height);
        min_width = Some(min_width.map_or(width, |m| m.min(width)));
        max_width = Some(max_width.map_or(width, |m| m.max(width)));
        min_height = Some(min_height.map_or(height, |m| m.min(height)));
        max_height = Some(max_height.map_or(height, |m| m.max(height)));

        if width * height <= 0.0 {
            stats.degenerate_area += 1;
        }
    }

    stats.min_width = min_width;
    stats.max_width = max_width;
    stats.min_height = min_height;
    stats.max_height = max_height;

    stats
}
