//! Image classification manifests: one class label per image.

use super::{
    decode_common, decode_identity, encode_common, encode_identity, Manifest, ManifestHeader,
    SampleName, SampleRecord, TaskKind,
};
use crate::dict::codec::{decode_field, encode_field};
use crate::dict::{Dict, Value};
use crate::error::DictaugError;
use crate::validation::{require, require_text, IssueContext, ValidationReport};

const IMAGE_LABEL_ID: &str = "image_label_id";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassificationManifest {
    pub header: ManifestHeader,
    pub samples: Option<Vec<ClassificationSample>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassificationSample {
    pub id: Option<i64>,
    pub file_name: Option<String>,
    pub label_id: Option<i64>,
}

impl ClassificationSample {
    pub fn new(id: i64, file_name: impl Into<String>, label_id: i64) -> Self {
        Self {
            id: Some(id),
            file_name: Some(file_name.into()),
            label_id: Some(label_id),
        }
    }
}

impl SampleRecord for ClassificationSample {
    /// The class label.
    type Geometry = i64;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    fn decode(dict: &Dict) -> Self {
        let (id, file_name) = decode_identity(dict);
        Self {
            id,
            file_name,
            label_id: decode_field(dict, IMAGE_LABEL_ID, Value::as_int),
        }
    }

    fn encode(&self) -> Dict {
        let mut dict = Dict::new();
        encode_identity(&mut dict, self.id, self.file_name());
        encode_field(&mut dict, IMAGE_LABEL_ID, self.label_id);
        dict
    }

    fn check(&self, context: &IssueContext, report: &mut ValidationReport) {
        require(report, context, "image_id", self.id.is_some());
        require_text(report, context, "image_file_name", self.file_name());
        require(report, context, IMAGE_LABEL_ID, self.label_id.is_some());
    }

    fn label_ids(&self) -> Vec<i64> {
        self.label_id.into_iter().collect()
    }

    fn object_count(&self) -> usize {
        1
    }

    fn geometry(&self) -> Option<i64> {
        self.label_id
    }

    fn assemble(name: SampleName, label_id: i64) -> Self {
        Self::new(name.id, name.file_name, label_id)
    }
}

impl Manifest for ClassificationManifest {
    type Sample = ClassificationSample;

    const KIND: TaskKind = TaskKind::Classification;

    fn decode(dict: &Dict) -> Self {
        let (header, samples) = decode_common(dict);
        Self { header, samples }
    }

    fn encode(&self) -> Result<Dict, DictaugError> {
        encode_common(&self.header, self.samples())
    }

    fn header(&self) -> &ManifestHeader {
        &self.header
    }

    fn samples(&self) -> Option<&[ClassificationSample]> {
        self.samples.as_deref()
    }

    fn with_samples(
        &self,
        image_dir: String,
        _segmentation_dir: Option<String>,
        samples: Vec<ClassificationSample>,
    ) -> Self {
        Self {
            header: ManifestHeader {
                image_dir: Some(image_dir),
                ..self.header.clone()
            },
            samples: Some(samples),
        }
    }
}
