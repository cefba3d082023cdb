//! Benchmarks for section inference and page assembly.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pdfstruct::convert::assemble_page;
use pdfstruct::parser::{LinkAnnotation, PageLayout, TableGrid, TextLine};
use pdfstruct::structure::detect_headings;
use pdfstruct::{ContextPolicy, Rect, SectionMap};

/// A page of `line_count` lines with a numbered heading every tenth line.
fn synthetic_lines(line_count: usize) -> Vec<TextLine> {
    (0..line_count)
        .map(|i| {
            let top = 40.0 + i as f32 * 12.0;
            let bbox = Rect::new(72.0, top, 500.0, top + 10.0);
            match i % 10 {
                0 => TextLine::new(format!("{} Section", i / 10 + 1), bbox, 14.0),
                5 => TextLine::new(format!("Figure {}: Allocation", i), bbox, 9.0),
                _ => TextLine::new("Portfolio holdings and sector weights", bbox, 9.0),
            }
        })
        .collect()
}

fn synthetic_layout(line_count: usize) -> PageLayout {
    PageLayout {
        lines: synthetic_lines(line_count),
        tables: vec![TableGrid::new(vec![vec![Some("Equity".to_string()), None]; 8])
            .with_bbox(Rect::new(72.0, 300.0, 500.0, 400.0))],
        links: vec![LinkAnnotation::new(
            Some("https://example.com".to_string()),
            Rect::new(72.0, 700.0, 200.0, 712.0),
        )],
    }
}

fn bench_detect_headings(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_headings");

    for count in [50, 500] {
        let lines = synthetic_lines(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &lines, |b, lines| {
            b.iter(|| detect_headings(black_box(lines)));
        });
    }

    group.finish();
}

fn bench_section_lookup(c: &mut Criterion) {
    let sections = SectionMap::build(&synthetic_lines(500));

    c.bench_function("section_resolve", |b| {
        b.iter(|| {
            for pos in (0..6000).step_by(7) {
                black_box(sections.resolve(black_box(pos as f32)));
            }
        });
    });
}

fn bench_assemble_page(c: &mut Criterion) {
    let layout = synthetic_layout(200);

    c.bench_function("assemble_page", |b| {
        b.iter(|| assemble_page(1, black_box(&layout), ContextPolicy::all()));
    });
}

criterion_group!(
    benches,
    bench_detect_headings,
    bench_section_lookup,
    bench_assemble_page,
);
criterion_main!(benches);
