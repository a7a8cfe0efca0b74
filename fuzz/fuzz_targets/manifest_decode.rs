#![no_main]
use libfuzzer_sys::fuzz_target;
use provenant::manifest::ManifestStore;
use provenant::platforms::PlatformRegistry;

fuzz_target!(|data: &[u8]| {
    let Ok(store) = serde_json::from_slice::<ManifestStore>(data) else {
        return;
    };
    let _ = store.validation_report();
    let registry = PlatformRegistry::with_default_platforms();
    if let (_, Some(extractor)) = registry.identify(store.active(), data) {
        let md = extractor.extract_metadata(store.active(), data);
        let _ = extractor.is_ai_generated(&md);
    }
});
