#![no_main]

use libfuzzer_sys::fuzz_target;
use manifest_collector::parsers::gomod::GoModParser;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Reuse the input's own lines as a synthetic import list
        let imports: Vec<String> = content.lines().take(8).map(str::to_string).collect();
        let deps = GoModParser::new().parse(content, &imports);
        let line_count = content.split('\n').count() as u32;

        for dep in &deps {
            assert!(!dep.name.value.trim().is_empty(), "name must not be blank");
            assert!(dep.version.value.starts_with('v'), "version must carry the v prefix");
            assert!(
                dep.version.position.line >= 1 && dep.version.position.line <= line_count,
                "version line out of range"
            );
        }
    }
});
