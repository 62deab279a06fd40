//! Instance segmentation manifests: one mask region plus one labeled
//! axis-aligned box per object.
//!
//! The masks of a sample are stored as one concatenated region object under
//! `mask`, in object order. A sample without objects has no `mask` key, so
//! its mask field reads back as absent.

use super::object_detection::{
    split_boxes, zip_boxes, BBOX_COL1, BBOX_COL2, BBOX_LABEL_ID, BBOX_ROW1, BBOX_ROW2,
};
use super::{
    decode_common, decode_identity, encode_common, encode_identity, len_of, Manifest,
    ManifestHeader, SampleName, SampleRecord, TaskKind,
};
use crate::dict::codec::{decode_field, decode_regions, encode_field, encode_regions};
use crate::dict::{Dict, Value};
use crate::error::DictaugError;
use crate::geometry::{AxisBox, Flip, Mirror, Region};
use crate::validation::{
    require, require_same_lengths, require_text, IssueContext, ValidationReport,
};

const MASK: &str = "mask";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceSegmentationManifest {
    pub header: ManifestHeader,
    pub samples: Option<Vec<InstanceSegmentationSample>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceSegmentationSample {
    pub id: Option<i64>,
    pub file_name: Option<String>,
    pub mask: Option<Vec<Region>>,
    pub bbox_label_id: Option<Vec<i64>>,
    pub bbox_row1: Option<Vec<f64>>,
    pub bbox_col1: Option<Vec<f64>>,
    pub bbox_row2: Option<Vec<f64>>,
    pub bbox_col2: Option<Vec<f64>>,
}

/// One object of an instance segmentation sample.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceObject {
    pub label_id: i64,
    pub bbox: AxisBox,
    pub mask: Region,
}

impl InstanceObject {
    pub fn new(label_id: i64, bbox: AxisBox, mask: Region) -> Self {
        Self {
            label_id,
            bbox,
            mask,
        }
    }

    /// An object whose box is the bounding box of its mask.
    pub fn from_mask(label_id: i64, mask: Region) -> Self {
        let bbox = mask.bounding_box().unwrap_or_default();
        Self::new(label_id, bbox, mask)
    }
}

impl Mirror for InstanceObject {
    fn mirrored(&self, flip: Flip, width: u32, height: u32) -> Self {
        Self::new(
            self.label_id,
            self.bbox.mirrored(flip, width, height),
            self.mask.mirrored(flip, width, height),
        )
    }
}

impl InstanceSegmentationSample {
    pub fn new(id: i64, file_name: impl Into<String>, objects: Vec<InstanceObject>) -> Self {
        Self::assemble(
            SampleName {
                id,
                file_name: file_name.into(),
                segmentation_file_name: None,
            },
            objects,
        )
    }
}

impl SampleRecord for InstanceSegmentationSample {
    type Geometry = Vec<InstanceObject>;

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
            mask: decode_regions(dict, MASK),
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
        encode_regions(&mut dict, MASK, self.mask.as_deref());
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
        require(report, context, MASK, self.mask.is_some());
        require(report, context, BBOX_LABEL_ID, self.bbox_label_id.is_some());
        require(report, context, BBOX_ROW1, self.bbox_row1.is_some());
        require(report, context, BBOX_COL1, self.bbox_col1.is_some());
        require(report, context, BBOX_ROW2, self.bbox_row2.is_some());
        require(report, context, BBOX_COL2, self.bbox_col2.is_some());

        require_same_lengths(
            report,
            context,
            (MASK, len_of(&self.mask)),
            &[
                (BBOX_LABEL_ID, len_of(&self.bbox_label_id)),
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

    fn geometry(&self) -> Option<Vec<InstanceObject>> {
        let masks = self.mask.as_ref()?;
        let labels = self.bbox_label_id.as_ref()?;
        if labels.len() != masks.len() {
            return None;
        }
        let boxes = zip_boxes(
            masks.len(),
            &self.bbox_row1,
            &self.bbox_col1,
            &self.bbox_row2,
            &self.bbox_col2,
        )?;

        Some(
            masks
                .iter()
                .zip(labels)
                .zip(boxes)
                .map(|((mask, &label_id), bbox)| InstanceObject::new(label_id, bbox, mask.clone()))
                .collect(),
        )
    }

    fn assemble(name: SampleName, objects: Vec<InstanceObject>) -> Self {
        let axis: Vec<AxisBox> = objects.iter().map(|o| o.bbox).collect();
        let (row1, col1, row2, col2) = split_boxes(&axis);
        Self {
            id: Some(name.id),
            file_name: Some(name.file_name),
            bbox_label_id: Some(objects.iter().map(|o| o.label_id).collect()),
            mask: Some(objects.into_iter().map(|o| o.mask).collect()),
            bbox_row1: Some(row1),
            bbox_col1: Some(col1),
            bbox_row2: Some(row2),
            bbox_col2: Some(col2),
        }
    }
}

impl Manifest for InstanceSegmentationManifest {
    type Sample = InstanceSegmentationSample;

    const KIND: TaskKind = TaskKind::InstanceSegmentation;

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

    fn samples(&self) -> Option<&[InstanceSegmentationSample]> {
        self.samples.as_deref()
    }

    fn with_samples(
        &self,
        image_dir: String,
        _segmentation_dir: Option<String>,
        samples: Vec<InstanceSegmentationSample>,
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

    fn sample(id: i64, name: &str) -> InstanceSegmentationSample {
        InstanceSegmentationSample::new(
            id,
            name,
            vec![
                InstanceObject::from_mask(1, Region::rectangle(2, 3, 10, 12)),
                InstanceObject::from_mask(2, Region::rectangle(20, 20, 21, 40)),
                InstanceObject::from_mask(1, Region::rectangle(0, 0, 0, 0)),
            ],
        )
    }

    fn manifest() -> InstanceSegmentationManifest {
        InstanceSegmentationManifest {
            header: ManifestHeader::new(vec![1, 2], vec!["crack".into(), "dent".into()], "/is"),
            samples: Some(vec![sample(1, "a.png"), sample(2, "b.png")]),
        }
    }

    #[test]
    fn test_valid_manifest() {
        let report = manifest().validate();
        assert!(report.is_clean(), "unexpected issues: {:?}", report.issues);
    }

    #[test]
    fn test_roundtrip_preserves_mask_order() {
        let original = manifest();
        let dict = original.encode().expect("encode");
        let decoded = InstanceSegmentationManifest::decode(&dict);
        assert_eq!(decoded, original);

        let masks = decoded.samples.as_ref().and_then(|s| s[0].mask.clone()).expect("mask");
        assert_eq!(masks[0], Region::rectangle(2, 3, 10, 12));
        assert_eq!(masks[2].area(), 1);
    }

    #[test]
    fn test_empty_mask_is_omitted() {
        let s = InstanceSegmentationSample::new(5, "empty.png", Vec::new());
        assert_eq!(s.mask, Some(Vec::new()));

        let dict = s.encode();
        assert!(!dict.contains_key(MASK));
        assert_eq!(InstanceSegmentationSample::decode(&dict).mask, None);
    }

    #[test]
    fn test_absent_mask_is_missing_field() {
        let mut m = manifest();
        if let Some(samples) = m.samples.as_mut() {
            samples[0].mask = None;
        }
        let report = m.validate();
        assert_eq!(
            report.messages(),
            vec!["sample #0 (id 1): mask is missing"]
        );
    }

    #[test]
    fn test_mask_count_mismatch() {
        let mut m = manifest();
        if let Some(samples) = m.samples.as_mut() {
            if let Some(mask) = samples[1].mask.as_mut() {
                mask.pop();
            }
        }
        let report = m.validate();
        assert_eq!(report.count(IssueCode::LengthMismatch), 5);
        assert_eq!(
            report.messages()[0],
            "sample #1 (id 2): mask and bbox_label_id differ in length (2 vs 3)"
        );
    }

    #[test]
    fn test_object_box_follows_mask_through_flip() {
        let object = InstanceObject::from_mask(1, Region::rectangle(2, 3, 10, 12));
        let flipped = object.mirrored(Flip::Horizontal, 32, 32);
        assert_eq!(flipped.mask.bounding_box(), Some(flipped.bbox));
    }
}
