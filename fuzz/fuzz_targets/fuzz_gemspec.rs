#![no_main]

use gem_manifest::edit::{self, DeclarationOptions, EditStyle, QuoteStyle};
use gem_manifest::parsers::Parser;
use gem_manifest::parsers::gemspec::GemspecParser;
use libfuzzer_sys::fuzz_target;

const STYLE: EditStyle<'static> = EditStyle {
    quote: None,
    default_quote: QuoteStyle::Double,
    indent: "  ",
};

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let doc = GemspecParser::new().parse(content);
        let lines = content.lines().count();
        for decl in &doc.declarations {
            assert!((decl.line as usize) < lines, "decl.line out of range");
        }

        // Insertion either fails cleanly or yields a file the parser finds it in
        if let Ok(edit) =
            edit::add_dependency(content, "fuzzgem", &DeclarationOptions::default(), STYLE)
        {
            let reparsed = GemspecParser::new().parse(&edit.text);
            assert!(reparsed.find("fuzzgem").is_some(), "inserted dependency lost");
        }
    }
});
