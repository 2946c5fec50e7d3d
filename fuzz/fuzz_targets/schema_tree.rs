#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(xsd) = std::str::from_utf8(data) {
        let _ = xsd_catalog::SchemaTree::parse_with_namespace(xsd, Some("urn:fuzz"));
    }
});
