#![no_main]

use libfuzzer_sys::fuzz_target;
use manifest_collector::parsers::package_json::PackageJsonParser;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let Ok(deps) = PackageJsonParser::new().parse(content) else {
            return;
        };
        let line_count = content.split('\n').count() as u32;

        for dep in &deps {
            for value in [&dep.name, &dep.version] {
                assert!(
                    value.position.line >= 1 && value.position.line <= line_count,
                    "line out of range"
                );
                assert!(value.position.column >= 1, "column must be 1-based");
            }
        }
    }
});
