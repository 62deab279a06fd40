//! Object detection manifests: axis-aligned boxes, each with a class label.
//!
//! Boxes are stored as parallel arrays (`bbox_label_id`, `bbox_row1`,
//! `bbox_col1`, `bbox_row2`, `bbox_col2`) that must agree in length.

use super::{
    decode_common, decode_identity, encode_common, encode_identity, len_of, Manifest,
    ManifestHeader, SampleName, SampleRecord, TaskKind,
};
use crate::dict::codec::{decode_field, encode_field};
use crate::dict::{Dict, Value};
use crate::error::DictaugError;
use crate::geometry::{AxisBox, Flip, Mirror};
use crate::validation::{
    require, require_same_lengths, require_text, IssueContext, ValidationReport,
};

pub(crate) const BBOX_LABEL_ID: &str = "bbox_label_id";
pub(crate) const BBOX_ROW1: &str = "bbox_row1";
pub(crate) const BBOX_COL1: &str = "bbox_col1";
pub(crate) const BBOX_ROW2: &str = "bbox_row2";
pub(crate) const BBOX_COL2: &str = "bbox_col2";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectDetectionManifest {
    pub header: ManifestHeader,
    pub samples: Option<Vec<ObjectDetectionSample>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectDetectionSample {
    pub id: Option<i64>,
    pub file_name: Option<String>,
    pub bbox_label_id: Option<Vec<i64>>,
    pub bbox_row1: Option<Vec<f64>>,
    pub bbox_col1: Option<Vec<f64>>,
    pub bbox_row2: Option<Vec<f64>>,
    pub bbox_col2: Option<Vec<f64>>,
}

/// One box of an object detection sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabeledBox {
    pub label_id: i64,
    pub bbox: AxisBox,
}

impl LabeledBox {
    pub fn new(label_id: i64, bbox: AxisBox) -> Self {
        Self { label_id, bbox }
    }
}

impl Mirror for LabeledBox {
    fn mirrored(&self, flip: Flip, width: u32, height: u32) -> Self {
        Self::new(self.label_id, self.bbox.mirrored(flip, width, height))
    }
}

impl ObjectDetectionSample {
    pub fn new(id: i64, file_name: impl Into<String>, boxes: &[LabeledBox]) -> Self {
        Self::assemble(
            SampleName {
                id,
                file_name: file_name.into(),
                segmentation_file_name: None,
            },
            boxes.to_vec(),
        )
    }
}

/// Splits boxes into the parallel array form.
pub(crate) fn split_boxes(
    boxes: &[AxisBox],
) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    let row1 = boxes.iter().map(|b| b.row1).collect();
    let col1 = boxes.iter().map(|b| b.col1).collect();
    let row2 = boxes.iter().map(|b| b.row2).collect();
    let col2 = boxes.iter().map(|b| b.col2).collect();
    (row1, col1, row2, col2)
}

/// Zips the parallel array form into boxes, if all arrays are present and
/// of length `len`.
pub(crate) fn zip_boxes(
    len: usize,
    row1: &Option<Vec<f64>>,
    col1: &Option<Vec<f64>>,
    row2: &Option<Vec<f64>>,
    col2: &Option<Vec<f64>>,
) -> Option<Vec<AxisBox>> {
    let (row1, col1, row2, col2) = (row1.as_ref()?, col1.as_ref()?, row2.as_ref()?, col2.as_ref()?);
    if [row1.len(), col1.len(), row2.len(), col2.len()]
        .iter()
        .any(|&l| l != len)
    {
        return None;
    }
    Some(
        (0..len)
            .map(|i| AxisBox::new(row1[i], col1[i], row2[i], col2[i]))
            .collect(),
    )
}

impl SampleRecord for ObjectDetectionSample {
    type Geometry = Vec<LabeledBox>;

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
            bbox_label_id: decode_field(dict, BBOX_LABEL_ID, Value::as_ints),
            bbox_row1: decode_field(dict, BBOX_ROW1, Value::as_reals),
            bbox_col1: decode_field(dict, BBOX_COL1, Value::as_reals),
            bbox_row2: decode_field(dict, BBOX_ROW2, Value::as_reals),
            bbox_col2: decode_field(dict, BBOX_COL2, Value::as_reals),
        }
    }

    fn encode(&self) -> Dict {
        let mut dict = Dict::new();
        encode_identity(&mut dict, self.id, self.file_name());
        encode_field(&mut dict, BBOX_LABEL_ID, self.bbox_label_id.clone());
        encode_field(&mut dict, BBOX_ROW1, self.bbox_row1.clone());
        encode_field(&mut dict, BBOX_COL1, self.bbox_col1.clone());
        encode_field(&mut dict, BBOX_ROW2, self.bbox_row2.clone());
        encode_field(&mut dict, BBOX_COL2, self.bbox_col2.clone());
        dict
    }

    fn check(&self, context: &IssueContext, report: &mut ValidationReport) {
        require(report, context, "image_id", self.id.is_some());
        require_text(report, context, "image_file_name", self.file_name());
        require(report, context, BBOX_LABEL_ID, self.bbox_label_id.is_some());
        require(report, context, BBOX_ROW1, self.bbox_row1.is_some());
        require(report, context, BBOX_COL1, self.bbox_col1.is_some());
        require(report, context, BBOX_ROW2, self.bbox_row2.is_some());
        require(report, context, BBOX_COL2, self.bbox_col2.is_some());

        require_same_lengths(
            report,
            context,
            (BBOX_LABEL_ID, len_of(&self.bbox_label_id)),
            &[
                (BBOX_ROW1, len_of(&self.bbox_row1)),
                (BBOX_COL1, len_of(&self.bbox_col1)),
                (BBOX_ROW2, len_of(&self.bbox_row2)),
                (BBOX_COL2, len_of(&self.bbox_col2)),
            ],
        );
    }

    fn label_ids(&self) -> Vec<i64> {
        self.bbox_label_id.clone().unwrap_or_default()
    }

    fn geometry(&self) -> Option<Vec<LabeledBox>> {
        let labels = self.bbox_label_id.as_ref()?;
        let boxes = zip_boxes(
            labels.len(),
            &self.bbox_row1,
            &self.bbox_col1,
            &self.bbox_row2,
            &self.bbox_col2,
        )?;
        Some(
            labels
                .iter()
                .zip(boxes)
                .map(|(&label_id, bbox)| LabeledBox::new(label_id, bbox))
                .collect(),
        )
    }

    fn assemble(name: SampleName, boxes: Vec<LabeledBox>) -> Self {
        let labels = boxes.iter().map(|b| b.label_id).collect();
        let axis: Vec<AxisBox> = boxes.iter().map(|b| b.bbox).collect();
        let (row1, col1, row2, col2) = split_boxes(&axis);
        Self {
            id: Some(name.id),
            file_name: Some(name.file_name),
            bbox_label_id: Some(labels),
            bbox_row1: Some(row1),
            bbox_col1: Some(col1),
            bbox_row2: Some(row2),
            bbox_col2: Some(col2),
        }
    }
}

impl Manifest for ObjectDetectionManifest {
    type Sample = ObjectDetectionSample;

    const KIND: TaskKind = TaskKind::ObjectDetection;

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

    fn samples(&self) -> Option<&[ObjectDetectionSample]> {
        self.samples.as_deref()
    }

    fn with_samples(
        &self,
        image_dir: String,
        _segmentation_dir: Option<String>,
        samples: Vec<ObjectDetectionSample>,
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
