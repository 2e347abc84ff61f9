//! Benchmark harness for parameter metadata.
//!
//! Uses criterion for reliable benchmarking.
//! Run with: cargo bench -p rshell_params

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rshell_params::{CommandDeclaration, CommandMetadata, ParameterDescriptor, ParameterSetMetadata};

/// A command shaped like a typical file cmdlet: a handful of declared
/// parameters over three sets, plus every shared group.
fn file_command() -> CommandDeclaration {
    let mut declaration = CommandDeclaration::new("Get-ChildItem")
        .with_default_set("Items")
        .with_parameter(
            ParameterDescriptor::new("Path", "String[]")
                .in_set("Items", ParameterSetMetadata::default().at_position(0).from_pipeline()),
        )
        .with_parameter(
            ParameterDescriptor::new("LiteralPath", "String[]")
                .with_aliases(["PSPath", "LP"])
                .in_set("LiteralItems", ParameterSetMetadata::mandatory()),
        )
        .with_parameter(ParameterDescriptor::new("Filter", "String").in_set("Items", ParameterSetMetadata::default()))
        .with_parameter(ParameterDescriptor::new("Include", "String[]"))
        .with_parameter(ParameterDescriptor::new("Exclude", "String[]"))
        .with_parameter(ParameterDescriptor::switch("Recurse").with_alias("s"))
        .with_parameter(ParameterDescriptor::new("Depth", "UInt32"))
        .with_parameter(ParameterDescriptor::switch("Force"))
        .with_parameter(ParameterDescriptor::switch("Name").in_set("Names", ParameterSetMetadata::default()));
    declaration.supports_should_process = true;
    declaration.supports_paging = true;
    declaration
}

fn bench_compile(c: &mut Criterion) {
    let declaration = file_command();
    c.bench_function("compile_file_command", |b| {
        b.iter(|| CommandMetadata::compile(black_box(&declaration)))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let metadata = CommandMetadata::compile(&file_command()).expect("valid declaration");
    let mut group = c.benchmark_group("resolve");

    for token in ["-Path", "-rec", "-LP", "-ErrorAction", "-wi", "-Inc", "-Zzz"] {
        group.bench_with_input(BenchmarkId::new("exact", token), token, |b, token| {
            b.iter(|| metadata.resolve(black_box(token), true, false))
        });
    }
    group.bench_function("ambiguous", |b| b.iter(|| metadata.resolve(black_box("-In"), false, false)));

    group.finish();
}

criterion_group!(benches, bench_compile, bench_resolve);
criterion_main!(benches);
