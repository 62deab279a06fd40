//! Typed dataset manifests, one schema per task kind.
//!
//! Every schema shares the same manifest header (class table plus image
//! directory) and a list of task-specific sample records. Schemas implement
//! [`Manifest`], which provides the common `decode` / `encode` / `validate`
//! capability set; sample records implement [`SampleRecord`].
//!
//! Decoding is permissive: any field that is absent or malformed decodes to
//! `None` and is reported later by validation. Encoding requires the class
//! table to be present.
//!
//! # Example
//!
//! ```
//! use dictaug::dict::Dict;
//! use dictaug::manifest::{ClassificationManifest, Manifest};
//!
//! let dict = Dict::new()
//!     .with("class_ids", vec![0i64, 1])
//!     .with("class_names", vec!["ok".to_string(), "defect".into()])
//!     .with("image_dir", "/data/images")
//!     .with(
//!         "samples",
//!         vec![Dict::new()
//!             .with("image_id", 1i64)
//!             .with("image_file_name", "a.png")
//!             .with("image_label_id", 1i64)],
//!     );
//!
//! let manifest = ClassificationManifest::decode(&dict);
//! assert!(manifest.validate().is_clean());
//! assert_eq!(manifest.encode().unwrap(), dict);
//! ```

pub mod classification;
pub mod instance_segmentation;
pub mod object_detection;
pub mod oriented_detection;
pub mod semantic_segmentation;

mod any;

pub use any::AnyManifest;
pub use classification::{ClassificationManifest, ClassificationSample};
pub use instance_segmentation::{
    InstanceObject, InstanceSegmentationManifest, InstanceSegmentationSample,
};
pub use object_detection::{LabeledBox, ObjectDetectionManifest, ObjectDetectionSample};
pub use oriented_detection::{
    LabeledOrientedBox, OrientedDetectionManifest, OrientedDetectionSample,
};
pub use semantic_segmentation::{SemanticSegmentationManifest, SemanticSegmentationSample};

use std::fmt;
use std::fmt::Debug;

use crate::dict::codec::{decode_field, decode_records, encode_field, encode_records, string};
use crate::dict::{Dict, Value};
use crate::error::DictaugError;
use crate::validation::{validate_manifest, IssueContext, ValidationReport};

pub(crate) const CLASS_IDS: &str = "class_ids";
pub(crate) const CLASS_NAMES: &str = "class_names";
pub(crate) const IMAGE_DIR: &str = "image_dir";
pub(crate) const SAMPLES: &str = "samples";
pub(crate) const IMAGE_ID: &str = "image_id";
pub(crate) const IMAGE_FILE_NAME: &str = "image_file_name";

/// The kind of deep-learning task a manifest describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Classification,
    ObjectDetection,
    OrientedObjectDetection,
    InstanceSegmentation,
    SemanticSegmentation,
}

impl TaskKind {
    /// All task kinds, in declaration order.
    pub const ALL: [TaskKind; 5] = [
        TaskKind::Classification,
        TaskKind::ObjectDetection,
        TaskKind::OrientedObjectDetection,
        TaskKind::InstanceSegmentation,
        TaskKind::SemanticSegmentation,
    ];

    /// Human-readable name for the task kind.
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::Classification => "classification",
            TaskKind::ObjectDetection => "object-detection",
            TaskKind::OrientedObjectDetection => "oriented-object-detection",
            TaskKind::InstanceSegmentation => "instance-segmentation",
            TaskKind::SemanticSegmentation => "semantic-segmentation",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fields shared by every manifest: the class table and the image directory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManifestHeader {
    /// Class identifiers, positionally paired with `class_names`.
    pub class_ids: Option<Vec<i64>>,
    pub class_names: Option<Vec<String>>,
    /// Base directory that sample file names are resolved against.
    pub image_dir: Option<String>,
}

impl ManifestHeader {
    pub fn new(
        class_ids: Vec<i64>,
        class_names: Vec<String>,
        image_dir: impl Into<String>,
    ) -> Self {
        Self {
            class_ids: Some(class_ids),
            class_names: Some(class_names),
            image_dir: Some(image_dir.into()),
        }
    }

    pub fn decode(dict: &Dict) -> Self {
        Self {
            class_ids: decode_field(dict, CLASS_IDS, Value::as_ints),
            class_names: decode_field(dict, CLASS_NAMES, Value::as_strs),
            image_dir: decode_field(dict, IMAGE_DIR, string),
        }
    }

    /// Writes the header into `dict`.
    ///
    /// # Errors
    /// Fails if `class_ids` or `class_names` is unset.
    pub fn encode_into(&self, dict: &mut Dict) -> Result<(), DictaugError> {
        let class_ids = self
            .class_ids
            .clone()
            .ok_or(DictaugError::MissingField { field: CLASS_IDS })?;
        let class_names = self
            .class_names
            .clone()
            .ok_or(DictaugError::MissingField { field: CLASS_NAMES })?;

        dict.insert(CLASS_IDS, class_ids);
        dict.insert(CLASS_NAMES, class_names);
        encode_field(dict, IMAGE_DIR, self.image_dir.clone());
        Ok(())
    }
}

/// File naming of a sample produced by augmentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleName {
    pub id: i64,
    pub file_name: String,
    /// Mask file name, for tasks that pair each image with one.
    pub segmentation_file_name: Option<String>,
}

/// A per-sample record of one task kind.
pub trait SampleRecord: Clone + Debug + PartialEq {
    /// The sample's annotation payload as a typed view, as handed to a
    /// simplified transform.
    type Geometry: Clone + Debug;

    fn id(&self) -> Option<i64>;

    fn file_name(&self) -> Option<&str>;

    fn segmentation_file_name(&self) -> Option<&str> {
        None
    }

    /// Decodes a record from a sample sub-dict. Never fails.
    fn decode(dict: &Dict) -> Self;

    /// Encodes the record; absent fields are left unset.
    fn encode(&self) -> Dict;

    /// Reports missing required fields and inconsistent array lengths.
    fn check(&self, context: &IssueContext, report: &mut ValidationReport);

    /// Every class label the sample references.
    fn label_ids(&self) -> Vec<i64>;

    /// Number of annotated objects (1 for whole-image labels).
    fn object_count(&self) -> usize {
        self.label_ids().len()
    }

    /// The typed geometry view, or `None` if the record is incomplete.
    fn geometry(&self) -> Option<Self::Geometry>;

    /// Builds a record from a name and a geometry view.
    fn assemble(name: SampleName, geometry: Self::Geometry) -> Self;
}

/// A dataset manifest of one task kind.
pub trait Manifest: Clone + Debug + Sized {
    type Sample: SampleRecord;

    const KIND: TaskKind;

    /// Decodes a manifest from its dict form. Never fails.
    fn decode(dict: &Dict) -> Self;

    /// Encodes the manifest to its dict form.
    ///
    /// # Errors
    /// Fails if the class table is unset.
    fn encode(&self) -> Result<Dict, DictaugError>;

    fn header(&self) -> &ManifestHeader;

    fn samples(&self) -> Option<&[Self::Sample]>;

    /// Base directory for segmentation masks, for tasks that have one.
    fn segmentation_dir(&self) -> Option<&str> {
        None
    }

    /// Task-specific manifest-level checks. They run after the shared
    /// presence checks and before the class table and samples are checked.
    fn check_extra(&self, _report: &mut ValidationReport) {}

    /// Checks every invariant and returns all violations found.
    fn validate(&self) -> ValidationReport {
        validate_manifest(self)
    }

    /// A manifest with the same class table and task metadata, describing
    /// `samples` stored under the given directories.
    fn with_samples(
        &self,
        image_dir: String,
        segmentation_dir: Option<String>,
        samples: Vec<Self::Sample>,
    ) -> Self;
}

/// Decodes the header and sample list shared by all schemas.
pub(crate) fn decode_common<S: SampleRecord>(dict: &Dict) -> (ManifestHeader, Option<Vec<S>>) {
    let header = ManifestHeader::decode(dict);
    let samples = decode_records(dict, SAMPLES, S::decode);
    (header, samples)
}

/// Encodes the header and sample list shared by all schemas.
pub(crate) fn encode_common<S: SampleRecord>(
    header: &ManifestHeader,
    samples: Option<&[S]>,
) -> Result<Dict, DictaugError> {
    let mut dict = Dict::new();
    header.encode_into(&mut dict)?;
    encode_records(
        &mut dict,
        SAMPLES,
        samples.unwrap_or_default().iter().map(SampleRecord::encode),
    );
    Ok(dict)
}

/// Decodes the `image_id` / `image_file_name` pair.
pub(crate) fn decode_identity(dict: &Dict) -> (Option<i64>, Option<String>) {
    (
        decode_field(dict, IMAGE_ID, Value::as_int),
        decode_field(dict, IMAGE_FILE_NAME, string),
    )
}

pub(crate) fn encode_identity(dict: &mut Dict, id: Option<i64>, file_name: Option<&str>) {
    encode_field(dict, IMAGE_ID, id);
    encode_field(dict, IMAGE_FILE_NAME, file_name);
}

/// Length of an optional array, for cardinality checks.
pub(crate) fn len_of<T>(values: &Option<Vec<T>>) -> Option<usize> {
    values.as_ref().map(Vec::len)
}
