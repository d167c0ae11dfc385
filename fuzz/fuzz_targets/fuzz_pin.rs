#![no_main]

use gem_manifest::edit::{self, EditStyle, QuoteStyle};
use gem_manifest::file_types::ManifestKind;
use gem_manifest::parsers::Parser;
use gem_manifest::parsers::gemfile::GemfileParser;
use libfuzzer_sys::fuzz_target;

const STYLE: EditStyle<'static> = EditStyle {
    quote: None,
    default_quote: QuoteStyle::Single,
    indent: "  ",
};

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    let doc = GemfileParser::new().parse(content);
    let Some(target) = doc.declarations.first() else {
        return;
    };

    let Ok(first) = edit::pin(content, ManifestKind::Gemfile, &target.name, "~> 1.0", STYLE)
    else {
        return;
    };

    // Pinning is idempotent
    let second = edit::pin(&first.text, ManifestKind::Gemfile, &target.name, "~> 1.0", STYLE)
        .expect("declaration disappeared after pin");
    assert_eq!(first.text, second.text, "pin is not idempotent");

    // Only the pinned line changes
    let before: Vec<&str> = content.split_inclusive('\n').collect();
    let after: Vec<&str> = first.text.split_inclusive('\n').collect();
    assert_eq!(before.len(), after.len(), "line count changed");
    for (idx, (a, b)) in before.iter().zip(&after).enumerate() {
        if !first.lines.contains(&idx) {
            assert_eq!(a, b, "untouched line {idx} changed");
        }
    }
});
