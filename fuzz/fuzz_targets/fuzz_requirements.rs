#![no_main]

use libfuzzer_sys::fuzz_target;
use manifest_collector::parsers::Parser;
use manifest_collector::parsers::requirements::RequirementsParser;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let deps = RequirementsParser::new().parse(content);
        let line_count = content.split('\n').count() as u32;

        for dep in &deps {
            assert!(!dep.name.value.is_empty(), "name must not be empty");
            assert!(
                dep.version.position.line >= 1 && dep.version.position.line <= line_count,
                "version line out of range"
            );
            assert!(dep.version.position.column >= 1, "version column must be 1-based");
        }
    }
});
