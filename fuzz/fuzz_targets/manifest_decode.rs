//! Fuzz target for manifest decoding and validation.
//!
//! Any dict that parses must decode and validate as every task kind
//! without panicking, and re-encode whenever its class table is present.

#![no_main]

use dictaug::dict::io_json::from_json_slice;
use dictaug::manifest::{AnyManifest, TaskKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(dict) = from_json_slice(data) else {
        return;
    };

    for kind in TaskKind::ALL {
        let manifest = AnyManifest::decode(kind, &dict);
        let _ = manifest.validate();
        let _ = manifest.encode();
    }
});
