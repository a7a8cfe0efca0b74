#![no_main]
use libfuzzer_sys::fuzz_target;
use provenant::platforms::{default_extractors, PlatformRegistry};

fuzz_target!(|data: &[u8]| {
    let registry = PlatformRegistry::with_default_platforms();
    let _ = registry.identify(None, data);
    for extractor in default_extractors() {
        let md = extractor.extract_metadata(None, data);
        let _ = extractor.is_ai_generated(&md);
    }
});
