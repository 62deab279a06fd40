#![allow(dead_code)]

use dictaug::dict::Dict;
use dictaug::geometry::{AxisBox, OrientedBox, Region};
use dictaug::manifest::{
    ClassificationManifest, ClassificationSample, InstanceObject, InstanceSegmentationManifest,
    InstanceSegmentationSample, LabeledBox, LabeledOrientedBox, ManifestHeader,
    ObjectDetectionManifest, ObjectDetectionSample, OrientedDetectionManifest,
    OrientedDetectionSample, SemanticSegmentationManifest, SemanticSegmentationSample,
};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

// Coordinates are multiples of 0.25 so they survive a JSON round trip exactly.
fn coord() -> impl Strategy<Value = f64> {
    (-4000i32..4000).prop_map(|v| f64::from(v) * 0.25)
}

fn file_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}\\.(png|jpg|bmp)"
}

fn dir() -> impl Strategy<Value = String> {
    "/[a-z]{1,8}(/[a-z]{1,8})?"
}

/// A header with `1..=max_classes` classes, ids `0..n` and distinct names.
pub fn arb_header(max_classes: usize) -> impl Strategy<Value = ManifestHeader> {
    (1..=max_classes, dir()).prop_map(|(n, image_dir)| {
        ManifestHeader::new(
            (0..n as i64).collect(),
            (0..n).map(|i| format!("class{}", i)).collect(),
            image_dir,
        )
    })
}

pub fn arb_axis_box() -> impl Strategy<Value = AxisBox> {
    (coord(), coord(), coord(), coord())
        .prop_map(|(row1, col1, row2, col2)| AxisBox::new(row1, col1, row2, col2))
}

pub fn arb_oriented_box() -> impl Strategy<Value = OrientedBox> {
    (coord(), coord(), -12i32..=12, 0i32..400, 0i32..400).prop_map(|(row, col, phi, l1, l2)| {
        OrientedBox::new(
            row,
            col,
            f64::from(phi) * 0.25,
            f64::from(l1) * 0.5,
            f64::from(l2) * 0.5,
        )
    })
}

pub fn arb_region() -> impl Strategy<Value = Region> {
    (0i32..200, 0i32..200, 0i32..8, 0i32..8)
        .prop_map(|(row, col, h, w)| Region::rectangle(row, col, row + h, col + w))
}

/// Numbers samples `1..` in generation order so ids never collide.
fn numbered<T, S>(items: Vec<T>, build: impl Fn(i64, T) -> S) -> Vec<S> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| build(i as i64 + 1, item))
        .collect()
}

pub fn arb_classification(max_samples: usize) -> impl Strategy<Value = ClassificationManifest> {
    (
        arb_header(5),
        prop::collection::vec((file_name(), 0i64..5), 1..=max_samples),
    )
        .prop_map(|(header, samples)| ClassificationManifest {
            header,
            samples: Some(numbered(samples, |id, (name, label)| {
                ClassificationSample::new(id, name, label)
            })),
        })
}

pub fn arb_object_detection(
    max_samples: usize,
    max_boxes: usize,
) -> impl Strategy<Value = ObjectDetectionManifest> {
    let boxes = prop::collection::vec(
        (0i64..5, arb_axis_box()).prop_map(|(label, bbox)| LabeledBox::new(label, bbox)),
        1..=max_boxes,
    );
    (
        arb_header(5),
        prop::collection::vec((file_name(), boxes), 1..=max_samples),
    )
        .prop_map(|(header, samples)| ObjectDetectionManifest {
            header,
            samples: Some(numbered(samples, |id, (name, boxes)| {
                ObjectDetectionSample::new(id, name, &boxes)
            })),
        })
}

pub fn arb_oriented_detection(
    max_samples: usize,
    max_boxes: usize,
) -> impl Strategy<Value = OrientedDetectionManifest> {
    let boxes = prop::collection::vec(
        (0i64..5, arb_oriented_box()).prop_map(|(label, obox)| LabeledOrientedBox::new(label, obox)),
        1..=max_boxes,
    );
    (
        arb_header(5),
        prop::collection::vec((file_name(), boxes), 1..=max_samples),
    )
        .prop_map(|(header, samples)| OrientedDetectionManifest {
            header,
            samples: Some(numbered(samples, |id, (name, boxes)| {
                OrientedDetectionSample::new(id, name, &boxes)
            })),
        })
}

pub fn arb_instance_segmentation(
    max_samples: usize,
    max_objects: usize,
) -> impl Strategy<Value = InstanceSegmentationManifest> {
    let objects = prop::collection::vec(
        (0i64..5, arb_region()).prop_map(|(label, mask)| InstanceObject::from_mask(label, mask)),
        1..=max_objects,
    );
    (
        arb_header(5),
        prop::collection::vec((file_name(), objects), 1..=max_samples),
    )
        .prop_map(|(header, samples)| InstanceSegmentationManifest {
            header,
            samples: Some(numbered(samples, |id, (name, objects)| {
                InstanceSegmentationSample::new(id, name, objects)
            })),
        })
}

pub fn arb_semantic_segmentation(
    max_samples: usize,
) -> impl Strategy<Value = SemanticSegmentationManifest> {
    let custom = prop::option::of(prop::collection::vec(
        prop::option::of("[a-z]{1,6}".prop_map(|color| Dict::new().with("color", color))),
        1..4,
    ));
    (
        arb_header(5),
        dir(),
        custom,
        prop::collection::vec((file_name(), file_name()), 1..=max_samples),
    )
        .prop_map(|(header, segmentation_dir, class_custom_data, samples)| {
            SemanticSegmentationManifest {
                header,
                segmentation_dir: Some(segmentation_dir),
                class_custom_data,
                samples: Some(numbered(samples, |id, (name, label_image)| {
                    SemanticSegmentationSample::new(id, name, label_image)
                })),
            }
        })
}
