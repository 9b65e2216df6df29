//! Benchmarks for the normalization passes.
//!
//! Run with: cargo bench
//!
//! These benchmarks run the passes over synthetic pages of various sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use texbook::normalize::{convert_citations, normalize_markdown, NormalizeOptions};

/// Creates a converted page with the given number of paragraphs.
fn create_test_markdown(paragraph_count: usize) -> String {
    let mut page = String::from("---\ntitle: Benchmark\n---\n\n# Chapter\n\n");

    for i in 0..paragraph_count {
        if i % 10 == 0 {
            page.push_str(&format!("#### Skipped level {}\n\n", i));
        }
        page.push_str(&format!(
            "Paragraph {} on [LLMs]{{acronym-label=\"llm\"}} and [agents]{{acronym-label=\"agent\"}} [\\@ref{}; \\@other].\n\n",
            i, i
        ));
        if i % 25 == 0 {
            page.push_str(&format!("![Figure {}](figures/plot{}.pdf \"Plot\")\n\n", i, i));
        }
    }

    page
}

/// Creates a LaTeX section body with the given number of paragraphs.
fn create_test_latex(paragraph_count: usize) -> String {
    (0..paragraph_count)
        .map(|i| {
            format!(
                "Results \\cite{{a{i},b{i}}} agree with \\textcite{{c{i}}} and \\autocite{{d{i},,e{i}}}.\n\n"
            )
        })
        .collect()
}

/// Benchmark the full normalization pipeline.
fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_markdown");
    let options = NormalizeOptions::default();

    for para_count in [10, 100, 500, 1000].iter() {
        let page = create_test_markdown(*para_count);

        group.throughput(Throughput::Bytes(page.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("paragraphs", para_count),
            &page,
            |b, page| {
                b.iter(|| normalize_markdown(black_box(page), &options));
            },
        );
    }

    group.finish();
}

/// Benchmark citation rewriting on LaTeX input.
fn bench_citations(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_citations");

    for para_count in [10, 100, 1000].iter() {
        let latex = create_test_latex(*para_count);

        group.throughput(Throughput::Bytes(latex.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("paragraphs", para_count),
            &latex,
            |b, latex| {
                b.iter(|| convert_citations(black_box(latex)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_citations);
criterion_main!(benches);
