//! Semantic segmentation manifests: each image is paired with a label image
//! stored under a separate segmentation directory.

use super::{
    decode_common, decode_identity, encode_common, encode_identity, Manifest, ManifestHeader,
    SampleName, SampleRecord, TaskKind,
};
use crate::dict::codec::{decode_field, encode_field, string};
use crate::dict::Dict;
use crate::error::DictaugError;
use crate::validation::{require, require_text, IssueCode, IssueContext, ValidationReport};

const SEGMENTATION_DIR: &str = "segmentation_dir";
const SEGMENTATION_FILE_NAME: &str = "segmentation_file_name";
const CLASS_CUSTOM_DATA: &str = "class_custom_data";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SemanticSegmentationManifest {
    pub header: ManifestHeader,
    /// Base directory that segmentation file names are resolved against.
    pub segmentation_dir: Option<String>,
    /// Optional per-class records, positionally aligned with `class_ids`.
    /// Entries may be uninitialized.
    pub class_custom_data: Option<Vec<Option<Dict>>>,
    pub samples: Option<Vec<SemanticSegmentationSample>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SemanticSegmentationSample {
    pub id: Option<i64>,
    pub file_name: Option<String>,
    pub segmentation_file_name: Option<String>,
}

impl SemanticSegmentationSample {
    pub fn new(
        id: i64,
        file_name: impl Into<String>,
        segmentation_file_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id),
            file_name: Some(file_name.into()),
            segmentation_file_name: Some(segmentation_file_name.into()),
        }
    }
}

impl SampleRecord for SemanticSegmentationSample {
    /// All annotation lives in the segmentation image.
    type Geometry = ();

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    fn segmentation_file_name(&self) -> Option<&str> {
        self.segmentation_file_name.as_deref()
    }

    fn decode(dict: &Dict) -> Self {
        let (id, file_name) = decode_identity(dict);
        Self {
            id,
            file_name,
            segmentation_file_name: decode_field(dict, SEGMENTATION_FILE_NAME, string),
        }
    }

    fn encode(&self) -> Dict {
        let mut dict = Dict::new();
        encode_identity(&mut dict, self.id, self.file_name());
        encode_field(
            &mut dict,
            SEGMENTATION_FILE_NAME,
            self.segmentation_file_name(),
        );
        dict
    }

    fn check(&self, context: &IssueContext, report: &mut ValidationReport) {
        require(report, context, "image_id", self.id.is_some());
        require_text(report, context, "image_file_name", self.file_name());
        require_text(
            report,
            context,
            SEGMENTATION_FILE_NAME,
            self.segmentation_file_name(),
        );
    }

    fn label_ids(&self) -> Vec<i64> {
        Vec::new()
    }

    fn object_count(&self) -> usize {
        1
    }

    fn geometry(&self) -> Option<()> {
        Some(())
    }

    fn assemble(name: SampleName, _geometry: ()) -> Self {
        Self {
            id: Some(name.id),
            file_name: Some(name.file_name),
            segmentation_file_name: name.segmentation_file_name,
        }
    }
}

impl Manifest for SemanticSegmentationManifest {
    type Sample = SemanticSegmentationSample;

    const KIND: TaskKind = TaskKind::SemanticSegmentation;

    fn decode(dict: &Dict) -> Self {
        let (header, samples) = decode_common(dict);
        Self {
            header,
            segmentation_dir: decode_field(dict, SEGMENTATION_DIR, string),
            class_custom_data: decode_field(dict, CLASS_CUSTOM_DATA, |v| {
                v.as_dicts().map(<[Option<Dict>]>::to_vec)
            }),
            samples,
        }
    }

    fn encode(&self) -> Result<Dict, DictaugError> {
        let mut dict = encode_common(&self.header, self.samples())?;
        encode_field(&mut dict, SEGMENTATION_DIR, self.segmentation_dir());
        encode_field(&mut dict, CLASS_CUSTOM_DATA, self.class_custom_data.clone());
        Ok(dict)
    }

    fn header(&self) -> &ManifestHeader {
        &self.header
    }

    fn samples(&self) -> Option<&[SemanticSegmentationSample]> {
        self.samples.as_deref()
    }

    fn segmentation_dir(&self) -> Option<&str> {
        self.segmentation_dir.as_deref()
    }

    fn check_extra(&self, report: &mut ValidationReport) {
        if self
            .segmentation_dir()
            .map_or(true, |dir| dir.trim().is_empty())
        {
            report.error(
                IssueCode::MissingSegmentationDir,
                "segmentation_dir is missing or blank",
                IssueContext::Manifest,
            );
        }

        if let (Some(data), Some(ids)) = (&self.class_custom_data, &self.header.class_ids) {
            if data.len() != ids.len() {
                report.warning(
                    IssueCode::ClassCustomDataLength,
                    format!(
                        "class_custom_data has {} entries but there are {} classes",
                        data.len(),
                        ids.len()
                    ),
                    IssueContext::Manifest,
                );
            }
        }
    }

    fn with_samples(
        &self,
        image_dir: String,
        segmentation_dir: Option<String>,
        samples: Vec<SemanticSegmentationSample>,
    ) -> Self {
        Self {
            header: ManifestHeader {
                image_dir: Some(image_dir),
                ..self.header.clone()
            },
            segmentation_dir: segmentation_dir.or_else(|| self.segmentation_dir.clone()),
            class_custom_data: self.class_custom_data.clone(),
            samples: Some(samples),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> SemanticSegmentationManifest {
        SemanticSegmentationManifest {
            header: ManifestHeader::new(
                vec![0, 1, 2],
                vec!["background".into(), "scratch".into(), "stain".into()],
                "/seg/images",
            ),
            segmentation_dir: Some("/seg/labels".into()),
            class_custom_data: Some(vec![
                None,
                Some(Dict::new().with("color", vec![255i64, 0, 0])),
                Some(Dict::new().with("color", vec![0i64, 0, 255])),
            ]),
            samples: Some(vec![
                SemanticSegmentationSample::new(1, "a.png", "a_label.png"),
                SemanticSegmentationSample::new(2, "b.png", "b_label.png"),
            ]),
        }
    }

    #[test]
    fn test_valid_manifest() {
        let report = manifest().validate();
        assert!(report.is_clean(), "unexpected issues: {:?}", report.issues);
    }

    #[test]
    fn test_roundtrip_keeps_null_custom_data_entries() {
        let original = manifest();
        let dict = original.encode().expect("encode");
        let decoded = SemanticSegmentationManifest::decode(&dict);
        assert_eq!(decoded, original);
        assert_eq!(decoded.class_custom_data.map(|d| d.len()), Some(3));
    }

    #[test]
    fn test_custom_data_is_optional() {
        let mut m = manifest();
        m.class_custom_data = None;
        assert!(m.validate().is_clean());

        let dict = m.encode().expect("encode");
        assert!(!dict.contains_key(CLASS_CUSTOM_DATA));
    }

    #[test]
    fn test_custom_data_length_is_warning() {
        let mut m = manifest();
        m.class_custom_data = Some(vec![None]);
        let report = m.validate();
        assert!(report.is_ok());
        assert_eq!(report.count(IssueCode::ClassCustomDataLength), 1);
    }

    #[test]
    fn test_missing_segmentation_fields() {
        let mut m = manifest();
        m.segmentation_dir = Some(" ".into());
        if let Some(samples) = m.samples.as_mut() {
            samples[1].segmentation_file_name = None;
        }
        let report = m.validate();
        assert_eq!(
            report.messages(),
            vec![
                "manifest: segmentation_dir is missing or blank",
                "sample #1 (id 2): segmentation_file_name is missing or blank",
            ]
        );
    }

    #[test]
    fn test_with_samples_moves_segmentation_dir() {
        let m = manifest();
        let out = m.with_samples(
            "/out".into(),
            Some("/out/segmentation".into()),
            vec![SemanticSegmentationSample::new(1, "a_1.png", "a_label_1.png")],
        );
        assert_eq!(out.segmentation_dir.as_deref(), Some("/out/segmentation"));
        assert_eq!(out.header.image_dir.as_deref(), Some("/out"));
        assert_eq!(out.class_custom_data, m.class_custom_data);
    }
}
