use criterion::{Criterion, criterion_group, criterion_main};
use suspension_engine::{TextReplayer, TokenCatalog, TokenSpec, restore, suspend};

fn catalog() -> TokenCatalog {
    TokenCatalog::new(vec![
        TokenSpec::new("record", r"\n?\^\^\^[ \t]*\n")
            .unwrap()
            .at_line_start()
            .transparent_to_line_start(),
        TokenSpec::new("header_atx", r"\n?#{1,6}[ \t]*")
            .unwrap()
            .at_line_start(),
        TokenSpec::new("pt_lines", r"[\w.;!?-]+(?:[ ]+[\w.;!?-]+)*")
            .unwrap()
            .plain_text(),
        TokenSpec::literal("gap_mark", "%").unwrap(),
        TokenSpec::literal("subtitle_mark", "@").unwrap(),
        TokenSpec::new("emphasis", r"\*\*?|__?").unwrap(),
    ])
}

fn generate_document(records: usize) -> String {
    let record = "^^^\n# Title %here\n\n@Paragraph with **some** content. @Another %sentence follows.\n\n";
    record.repeat(records)
}

fn bench_suspension(c: &mut Criterion) {
    let mut group = c.benchmark_group("suspension");
    group.sample_size(10);

    let catalog = catalog();
    let document = generate_document(200);
    let suspension = suspend(&document, &catalog, None);

    group.bench_function("suspend", |b| {
        b.iter(|| suspend(std::hint::black_box(&document), &catalog, None));
    });

    group.bench_function("restore", |b| {
        b.iter(|| {
            restore(
                std::hint::black_box(&suspension.filtered_text),
                &suspension.marks,
                None,
            )
        });
    });

    let edited = suspension.filtered_text.replace("content", "material");
    let replayer = TextReplayer::new(catalog.clone());
    group.bench_function("replay", |b| {
        b.iter(|| replayer.replay(std::hint::black_box(&edited), &document));
    });

    group.finish();
}

criterion_group!(benches, bench_suspension);
criterion_main!(benches);
