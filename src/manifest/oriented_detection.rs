//! Oriented object detection manifests: rotated rectangles given by center,
//! orientation and half side lengths.

use super::object_detection::BBOX_LABEL_ID;
use super::{
    decode_common, decode_identity, encode_common, encode_identity, len_of, Manifest,
    ManifestHeader, SampleName, SampleRecord, TaskKind,
};
use crate::dict::codec::{decode_field, encode_field};
use crate::dict::{Dict, Value};
use crate::error::DictaugError;
use crate::geometry::{Flip, Mirror, OrientedBox};
use crate::validation::{
    require, require_same_lengths, require_text, IssueContext, ValidationReport,
};

const BBOX_ROW: &str = "bbox_row";
const BBOX_COL: &str = "bbox_col";
const BBOX_LENGTH1: &str = "bbox_length1";
const BBOX_LENGTH2: &str = "bbox_length2";
const BBOX_PHI: &str = "bbox_phi";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrientedDetectionManifest {
    pub header: ManifestHeader,
    pub samples: Option<Vec<OrientedDetectionSample>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrientedDetectionSample {
    pub id: Option<i64>,
    pub file_name: Option<String>,
    pub bbox_label_id: Option<Vec<i64>>,
    pub bbox_row: Option<Vec<f64>>,
    pub bbox_col: Option<Vec<f64>>,
    pub bbox_length1: Option<Vec<f64>>,
    pub bbox_length2: Option<Vec<f64>>,
    /// Orientation in radians.
    pub bbox_phi: Option<Vec<f64>>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabeledOrientedBox {
    pub label_id: i64,
    pub obox: OrientedBox,
}

impl LabeledOrientedBox {
    pub fn new(label_id: i64, obox: OrientedBox) -> Self {
        Self { label_id, obox }
    }
}

impl Mirror for LabeledOrientedBox {
    fn mirrored(&self, flip: Flip, width: u32, height: u32) -> Self {
        Self::new(self.label_id, self.obox.mirrored(flip, width, height))
    }
}

impl OrientedDetectionSample {
    pub fn new(id: i64, file_name: impl Into<String>, boxes: &[LabeledOrientedBox]) -> Self {
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

impl SampleRecord for OrientedDetectionSample {
    type Geometry = Vec<LabeledOrientedBox>;

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
            bbox_row: decode_field(dict, BBOX_ROW, Value::as_reals),
            bbox_col: decode_field(dict, BBOX_COL, Value::as_reals),
            bbox_length1: decode_field(dict, BBOX_LENGTH1, Value::as_reals),
            bbox_length2: decode_field(dict, BBOX_LENGTH2, Value::as_reals),
            bbox_phi: decode_field(dict, BBOX_PHI, Value::as_reals),
        }
    }

    fn encode(&self) -> Dict {
        let mut dict = Dict::new();
        encode_identity(&mut dict, self.id, self.file_name());
        encode_field(&mut dict, BBOX_LABEL_ID, self.bbox_label_id.clone());
        encode_field(&mut dict, BBOX_ROW, self.bbox_row.clone());
        encode_field(&mut dict, BBOX_COL, self.bbox_col.clone());
        encode_field(&mut dict, BBOX_LENGTH1, self.bbox_length1.clone());
        encode_field(&mut dict, BBOX_LENGTH2, self.bbox_length2.clone());
        encode_field(&mut dict, BBOX_PHI, self.bbox_phi.clone());
        dict
    }

    fn check(&self, context: &IssueContext, report: &mut ValidationReport) {
        require(report, context, "image_id", self.id.is_some());
        require_text(report, context, "image_file_name", self.file_name());
        require(report, context, BBOX_LABEL_ID, self.bbox_label_id.is_some());
        require(report, context, BBOX_ROW, self.bbox_row.is_some());
        require(report, context, BBOX_COL, self.bbox_col.is_some());
        require(report, context, BBOX_LENGTH1, self.bbox_length1.is_some());
        require(report, context, BBOX_LENGTH2, self.bbox_length2.is_some());
        require(report, context, BBOX_PHI, self.bbox_phi.is_some());

        require_same_lengths(
            report,
            context,
            (BBOX_LABEL_ID, len_of(&self.bbox_label_id)),
            &[
                (BBOX_ROW, len_of(&self.bbox_row)),
                (BBOX_COL, len_of(&self.bbox_col)),
                (BBOX_LENGTH1, len_of(&self.bbox_length1)),
                (BBOX_LENGTH2, len_of(&self.bbox_length2)),
                (BBOX_PHI, len_of(&self.bbox_phi)),
            ],
        );
    }

    fn label_ids(&self) -> Vec<i64> {
        self.bbox_label_id.clone().unwrap_or_default()
    }

    fn geometry(&self) -> Option<Vec<LabeledOrientedBox>> {
        let labels = self.bbox_label_id.as_ref()?;
        let row = self.bbox_row.as_ref()?;
        let col = self.bbox_col.as_ref()?;
        let length1 = self.bbox_length1.as_ref()?;
        let length2 = self.bbox_length2.as_ref()?;
        let phi = self.bbox_phi.as_ref()?;

        let n = labels.len();
        if [row.len(), col.len(), length1.len(), length2.len(), phi.len()]
            .iter()
            .any(|&l| l != n)
        {
            return None;
        }

        Some(
            (0..n)
                .map(|i| {
                    LabeledOrientedBox::new(
                        labels[i],
                        OrientedBox::new(row[i], col[i], phi[i], length1[i], length2[i]),
                    )
                })
                .collect(),
        )
    }

    fn assemble(name: SampleName, boxes: Vec<LabeledOrientedBox>) -> Self {
        let column = |f: fn(&OrientedBox) -> f64| boxes.iter().map(|b| f(&b.obox)).collect();
        Self {
            id: Some(name.id),
            file_name: Some(name.file_name),
            bbox_label_id: Some(boxes.iter().map(|b| b.label_id).collect()),
            bbox_row: Some(column(|o: &OrientedBox| o.row)),
            bbox_col: Some(column(|o: &OrientedBox| o.col)),
            bbox_length1: Some(column(|o: &OrientedBox| o.length1)),
            bbox_length2: Some(column(|o: &OrientedBox| o.length2)),
            bbox_phi: Some(column(|o: &OrientedBox| o.phi)),
        }
    }
}

impl Manifest for OrientedDetectionManifest {
    type Sample = OrientedDetectionSample;

    const KIND: TaskKind = TaskKind::OrientedObjectDetection;

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

    fn samples(&self) -> Option<&[OrientedDetectionSample]> {
        self.samples.as_deref()
    }

    fn with_samples(
        &self,
        image_dir: String,
        _segmentation_dir: Option<String>,
        samples: Vec<OrientedDetectionSample>,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::IssueCode;

    fn manifest() -> OrientedDetectionManifest {
        OrientedDetectionManifest {
            header: ManifestHeader::new(vec![3], vec!["screw".into()], "/obb"),
            samples: Some(vec![OrientedDetectionSample::new(
                1,
                "a.png",
                &[
                    LabeledOrientedBox::new(3, OrientedBox::new(40.0, 60.0, 0.25, 12.0, 4.0)),
                    LabeledOrientedBox::new(3, OrientedBox::new(10.0, 10.0, -1.0, 3.0, 3.0)),
                ],
            )]),
        }
    }

    #[test]
    fn test_valid_manifest() {
        let report = manifest().validate();
        assert!(report.is_clean(), "unexpected issues: {:?}", report.issues);
    }

    #[test]
    fn test_roundtrip() {
        let original = manifest();
        let dict = original.encode().expect("encode");
        assert_eq!(OrientedDetectionManifest::decode(&dict), original);
    }

    #[test]
    fn test_geometry_view_preserves_phi() {
        let m = manifest();
        let geometry = m.samples.as_ref().and_then(|s| s[0].geometry()).expect("complete");
        assert_eq!(geometry[0].obox.phi, 0.25);
        assert_eq!(geometry[1].obox.length1, 3.0);
    }

    #[test]
    fn test_phi_length_mismatch() {
        let mut m = manifest();
        if let Some(samples) = m.samples.as_mut() {
            samples[0].bbox_phi = Some(vec![0.0, 0.1, 0.2]);
        }
        let report = m.validate();
        assert_eq!(report.count(IssueCode::LengthMismatch), 1);
        assert_eq!(
            report.messages(),
            vec!["sample #0 (id 1): bbox_label_id and bbox_phi differ in length (2 vs 3)"]
        );
        assert!(m.samples.as_ref().map_or(false, |s| s[0].geometry().is_none()));
    }

    #[test]
    fn test_missing_lengths_reported_individually() {
        let mut m = manifest();
        if let Some(samples) = m.samples.as_mut() {
            samples[0].bbox_length1 = None;
            samples[0].bbox_length2 = None;
        }
        let report = m.validate();
        assert_eq!(report.count(IssueCode::MissingSampleField), 2);
    }
}
