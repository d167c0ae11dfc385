#![no_main]

use gem_manifest::parsers::Parser;
use gem_manifest::parsers::gemfile::GemfileParser;
use libfuzzer_sys::fuzz_target;
use std::panic::AssertUnwindSafe;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let parser = GemfileParser::new();

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| parser.parse(content)));

        if let Ok(doc) = result {
            let lines: Vec<&str> = content.lines().collect();

            for decl in &doc.declarations {
                assert!(
                    (decl.line as usize) < lines.len(),
                    "decl.line out of range"
                );
                assert!(
                    lines[decl.line as usize].contains(decl.name.as_str()),
                    "declaration name must appear on its line"
                );
            }
        }
    }
});
