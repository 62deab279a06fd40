use super::{
    ClassificationManifest, InstanceSegmentationManifest, Manifest, ManifestHeader,
    ObjectDetectionManifest, OrientedDetectionManifest, SemanticSegmentationManifest, TaskKind,
};
use crate::dict::Dict;
use crate::error::DictaugError;
use crate::validation::ValidationReport;

/// A manifest whose task kind is only known at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyManifest {
    Classification(ClassificationManifest),
    ObjectDetection(ObjectDetectionManifest),
    OrientedObjectDetection(OrientedDetectionManifest),
    InstanceSegmentation(InstanceSegmentationManifest),
    SemanticSegmentation(SemanticSegmentationManifest),
}

macro_rules! dispatch {
    ($value:expr, $m:ident => $body:expr) => {
        match $value {
            AnyManifest::Classification($m) => $body,
            AnyManifest::ObjectDetection($m) => $body,
            AnyManifest::OrientedObjectDetection($m) => $body,
            AnyManifest::InstanceSegmentation($m) => $body,
            AnyManifest::SemanticSegmentation($m) => $body,
        }
    };
}

impl AnyManifest {
    /// Decodes `dict` with the schema of `kind`.
    pub fn decode(kind: TaskKind, dict: &Dict) -> Self {
        match kind {
            TaskKind::Classification => {
                Self::Classification(ClassificationManifest::decode(dict))
            }
            TaskKind::ObjectDetection => {
                Self::ObjectDetection(ObjectDetectionManifest::decode(dict))
            }
            TaskKind::OrientedObjectDetection => {
                Self::OrientedObjectDetection(OrientedDetectionManifest::decode(dict))
            }
            TaskKind::InstanceSegmentation => {
                Self::InstanceSegmentation(InstanceSegmentationManifest::decode(dict))
            }
            TaskKind::SemanticSegmentation => {
                Self::SemanticSegmentation(SemanticSegmentationManifest::decode(dict))
            }
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Classification(_) => ClassificationManifest::KIND,
            Self::ObjectDetection(_) => ObjectDetectionManifest::KIND,
            Self::OrientedObjectDetection(_) => OrientedDetectionManifest::KIND,
            Self::InstanceSegmentation(_) => InstanceSegmentationManifest::KIND,
            Self::SemanticSegmentation(_) => SemanticSegmentationManifest::KIND,
        }
    }

    pub fn header(&self) -> &ManifestHeader {
        dispatch!(self, m => m.header())
    }

    pub fn validate(&self) -> ValidationReport {
        dispatch!(self, m => m.validate())
    }

    pub fn encode(&self) -> Result<Dict, DictaugError> {
        dispatch!(self, m => m.encode())
    }

    /// Number of samples, or `None` if the manifest has no sample list.
    pub fn sample_count(&self) -> Option<usize> {
        dispatch!(self, m => m.samples().map(<[_]>::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_decoded_schema() {
        let dict = Dict::new();
        for kind in TaskKind::ALL {
            assert_eq!(AnyManifest::decode(kind, &dict).kind(), kind);
        }
    }

    #[test]
    fn test_empty_dict_reports_every_header_field() {
        let report = AnyManifest::decode(TaskKind::ObjectDetection, &Dict::new()).validate();
        assert_eq!(
            report.messages(),
            vec![
                "manifest: class_ids is missing",
                "manifest: image_dir is missing or blank",
                "manifest: class_names is missing",
                "manifest: samples is missing",
            ]
        );
    }
}
