//! Benchmark suite for gem-manifest
//!
//! Run with: `cargo bench --bench benchmarks`
//! View report: `open target/criterion/report/index.html`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use gem_manifest::edit::{self, DeclarationOptions, EditStyle, QuoteStyle};
use gem_manifest::file_types::ManifestKind;
use gem_manifest::parsers::Parser;
use gem_manifest::parsers::gemfile::GemfileParser;
use gem_manifest::parsers::gemspec::GemspecParser;

const STYLE: EditStyle<'static> = EditStyle {
    quote: None,
    default_quote: QuoteStyle::Single,
    indent: "  ",
};

// =============================================================================
// Test Data Generation
// =============================================================================

const GEMS: [(&str, &str); 10] = [
    ("rails", "~> 7.1.0"),
    ("pg", "~> 1.5"),
    ("puma", "~> 6.4"),
    ("redis", "~> 5.0"),
    ("sidekiq", "~> 7.2"),
    ("devise", "~> 4.9"),
    ("pundit", "~> 2.3"),
    ("ransack", "~> 4.1"),
    ("pagy", "~> 6.4"),
    ("rspec-rails", "~> 6.1"),
];

fn gem_name(i: usize) -> String {
    let (name, _) = GEMS[i % GEMS.len()];
    if i >= GEMS.len() {
        format!("{name}-{}", i / GEMS.len())
    } else {
        name.to_string()
    }
}

/// Gemfile with a third of the gems inside `group` blocks.
fn generate_gemfile(dep_count: usize) -> String {
    let mut content = String::from("source 'https://rubygems.org'\n\nruby '3.3.0'\n\n");
    let grouped = dep_count / 3;

    for i in 0..dep_count - grouped {
        let (_, version) = GEMS[i % GEMS.len()];
        content.push_str(&format!("gem '{}', '{version}'\n", gem_name(i)));
    }

    content.push_str("\ngroup :development, :test do\n");
    for i in dep_count - grouped..dep_count {
        let (_, version) = GEMS[i % GEMS.len()];
        content.push_str(&format!(
            "  gem '{}', '{version}', require: false\n",
            gem_name(i)
        ));
    }
    content.push_str("end\n");

    content
}

fn generate_gemspec(dep_count: usize) -> String {
    let mut content = String::from(
        "Gem::Specification.new do |spec|\n  spec.name = \"bench\"\n  spec.version = \"0.1.0\"\n  spec.required_ruby_version = \">= 3.0\"\n\n",
    );

    for i in 0..dep_count {
        let (_, version) = GEMS[i % GEMS.len()];
        let method = if i % 4 == 0 {
            "add_development_dependency"
        } else {
            "add_dependency"
        };
        content.push_str(&format!(
            "  spec.{method} \"{}\", \"{version}\"\n",
            gem_name(i)
        ));
    }

    content.push_str("end\n");
    content
}

// =============================================================================
// Parsing Benchmarks
// =============================================================================

fn bench_parsers(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsers");

    for dep_count in [10, 50, 100] {
        // Gemfile
        let gemfile_content = generate_gemfile(dep_count);
        let gemfile_parser = GemfileParser::new();
        group.bench_with_input(
            BenchmarkId::new("gemfile", dep_count),
            &gemfile_content,
            |b, content| {
                b.iter(|| gemfile_parser.parse(black_box(content)));
            },
        );

        // gemspec
        let gemspec_content = generate_gemspec(dep_count);
        let gemspec_parser = GemspecParser::new();
        group.bench_with_input(
            BenchmarkId::new("gemspec", dep_count),
            &gemspec_content,
            |b, content| {
                b.iter(|| gemspec_parser.parse(black_box(content)));
            },
        );
    }

    group.finish();
}

// =============================================================================
// Edit Benchmarks
// =============================================================================

fn bench_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("edits");

    for dep_count in [10, 50, 100] {
        let gemfile = generate_gemfile(dep_count);
        let last = gem_name(dep_count - 1);

        group.bench_with_input(BenchmarkId::new("pin_last", dep_count), &gemfile, |b, content| {
            b.iter(|| {
                edit::pin(
                    black_box(content),
                    ManifestKind::Gemfile,
                    &last,
                    ">= 1.0",
                    STYLE,
                )
            });
        });

        group.bench_with_input(BenchmarkId::new("unpin_last", dep_count), &gemfile, |b, content| {
            b.iter(|| edit::unpin(black_box(content), ManifestKind::Gemfile, &last));
        });

        let grouped = DeclarationOptions {
            groups: vec!["test".to_string(), "development".to_string()],
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::new("add_to_group", dep_count),
            &gemfile,
            |b, content| {
                b.iter(|| edit::add_declaration(black_box(content), "newgem", &grouped, STYLE));
            },
        );

        let gemspec = generate_gemspec(dep_count);
        group.bench_with_input(
            BenchmarkId::new("add_dependency", dep_count),
            &gemspec,
            |b, content| {
                b.iter(|| {
                    edit::add_dependency(
                        black_box(content),
                        "newgem",
                        &DeclarationOptions::default(),
                        STYLE,
                    )
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(benches, bench_parsers, bench_edits);

criterion_main!(benches);
