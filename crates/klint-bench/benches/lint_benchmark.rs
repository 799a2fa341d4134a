use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use klint_core::{EditorConfig, SyntaxTree};
use klint_rules::{IndentationRule, RuleEngine};
use std::hint::black_box;

const SMALL_FILE: &str = r#"fun main() {
    val total =
        items
            .map { it.price }
            .sum()
    if (total > 0) {
        println(total)
    }
}
"#;

const TABBED_FILE: &str = "class A {\n\tval x: Int\n\t\tget() = 1\n\n\tfun f(a: Int) {\n\t\treturn a\n\t}\n}\n";

fn generated_file(functions: usize) -> String {
    let mut content = String::new();
    for i in 0..functions {
        content.push_str(&format!(
            r#"
class Service{i}(
    private val client: Client,
) : Base<Service{i}>() {{
    val name: String
        get() = "service-{i}"

    fun call(request: Request): Response {{
        return client
            .prepare(request)
            .execute {{ response ->
                response.status == 200 &&
                    response.body != null
            }}
    }}
}}
"#
        ));
    }
    content
}

/// Benchmark the rule on a pre-parsed tree
fn bench_rule(c: &mut Criterion) {
    let mut group = c.benchmark_group("indent_rule");
    let config = EditorConfig::default();

    group.bench_function("small_file", |b| {
        let (tree, _) = SyntaxTree::parse(SMALL_FILE);
        b.iter(|| {
            let mut tree = tree.clone();
            black_box(IndentationRule.check(&mut tree, &config, false))
        });
    });

    group.bench_function("format_tabs", |b| {
        let (tree, _) = SyntaxTree::parse(TABBED_FILE);
        b.iter(|| {
            let mut tree = tree.clone();
            black_box(IndentationRule.check(&mut tree, &config, true))
        });
    });

    group.finish();
}

/// Benchmark parse + lint of large generated files
fn bench_large_files(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_files");
    let engine = RuleEngine::new();
    let config = EditorConfig::default();

    for &size in &[10, 50, 100, 500] {
        let content = generated_file(size);
        let bytes = content.len();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_classes_{}KB", size, bytes / 1024)),
            &content,
            |b, content| {
                b.iter(|| black_box(engine.lint(content, &config)));
            },
        );
    }

    group.finish();
}

/// Benchmark parallel linting of many files
fn bench_batch(c: &mut Criterion) {
    let engine = RuleEngine::new();
    let config = EditorConfig::default();
    let sources: Vec<String> = (0..64).map(|_| generated_file(5)).collect();

    c.bench_function("lint_batch_64_files", |b| {
        b.iter(|| black_box(engine.lint_batch(&sources, &config)));
    });
}

criterion_group!(benches, bench_rule, bench_large_files, bench_batch);
criterion_main!(benches);
