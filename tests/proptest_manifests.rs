use dictaug::dict::io_json::{from_json_str, to_json_string};
use dictaug::manifest::{AnyManifest, Manifest};
use proptest::prelude::*;

mod proptest_helpers;

/// Encodes, decodes and re-encodes through both the dict and its JSON text.
fn check_roundtrip<M: Manifest + PartialEq>(manifest: &M) -> Result<(), TestCaseError> {
    let dict = manifest.encode().expect("encode manifest");
    let restored = M::decode(&dict);
    prop_assert_eq!(manifest, &restored);

    let json = to_json_string(&dict).expect("serialize dict json");
    let parsed = from_json_str(&json).expect("parse dict json");
    prop_assert_eq!(&dict, &parsed);
    prop_assert_eq!(manifest, &M::decode(&parsed));
    Ok(())
}

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn classification_roundtrip_is_lossless(m in proptest_helpers::arb_classification(8)) {
        check_roundtrip(&m)?;
    }

    #[test]
    fn object_detection_roundtrip_is_lossless(m in proptest_helpers::arb_object_detection(6, 5)) {
        check_roundtrip(&m)?;
    }

    #[test]
    fn oriented_detection_roundtrip_is_lossless(
        m in proptest_helpers::arb_oriented_detection(6, 5)
    ) {
        check_roundtrip(&m)?;
    }

    #[test]
    fn instance_segmentation_roundtrip_is_lossless(
        m in proptest_helpers::arb_instance_segmentation(5, 4)
    ) {
        check_roundtrip(&m)?;
    }

    #[test]
    fn semantic_segmentation_roundtrip_is_lossless(
        m in proptest_helpers::arb_semantic_segmentation(6)
    ) {
        check_roundtrip(&m)?;
    }

    #[test]
    fn generated_manifests_have_no_errors(m in proptest_helpers::arb_object_detection(6, 5)) {
        let report = m.validate();
        prop_assert!(report.is_ok(), "unexpected errors: {:?}", report.messages());
    }

    #[test]
    fn any_manifest_agrees_with_typed_decode(m in proptest_helpers::arb_instance_segmentation(4, 3)) {
        let dict = m.encode().expect("encode manifest");
        let any = AnyManifest::decode(dictaug::manifest::TaskKind::InstanceSegmentation, &dict);

        prop_assert_eq!(any.sample_count(), m.samples.as_ref().map(Vec::len));
        prop_assert_eq!(any.encode().expect("encode any"), dict);
    }
}
