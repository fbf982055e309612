use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flatjson::{
    Cell, ColumnType, JsonWriter, LargeText, Link, OutputOptions, RowSet,
};

fn compact() -> OutputOptions {
    OutputOptions::default().with_indent(0)
}

fn people(rows: usize) -> RowSet {
    let mut set = RowSet::new()
        .with_column("ID", ColumnType::Number)
        .with_column("NAME", ColumnType::Varchar)
        .with_column("ACTIVE", ColumnType::Varchar);
    for index in 0..rows {
        set.push_row(vec![
            Cell::Number(index as f64),
            Cell::Varchar(format!("person {index}")),
            Cell::Varchar(if index % 2 == 0 { "TRUE" } else { "FALSE" }.to_string()),
        ])
        .unwrap();
    }
    set
}

fn bench_scalar_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for count in [1_000usize, 10_000] {
        group.bench_with_input(BenchmarkId::new("scalars", count), &count, |b, &count| {
            b.iter(|| {
                let mut writer = JsonWriter::to_text(&compact());
                writer.open_array().unwrap();
                for index in 0..count {
                    writer.open_object().unwrap();
                    writer.write_number("n", index as f64).unwrap();
                    writer.write_string("s", "some value here").unwrap();
                    writer.write_boolean("b", index % 2 == 0).unwrap();
                    writer.close_object().unwrap();
                }
                writer.close_array().unwrap();
                black_box(writer.into_output().unwrap())
            });
        });
    }
    group.finish();
}

fn bench_escaping(c: &mut Criterion) {
    let plain = "alphanumeric_only.text,with_nothing_to_escape".repeat(20);
    let hostile = "tabs\tquotes\" slashes / and spaces galore \u{1} é".repeat(20);
    c.bench_function("escape/plain", |b| {
        b.iter(|| flatjson::escape_json(black_box(&plain)));
    });
    c.bench_function("escape/hostile", |b| {
        b.iter(|| flatjson::escape_json(black_box(&hostile)));
    });
}

fn bench_largetext_streaming(c: &mut Criterion) {
    let body = LargeText::from("streamed body content ".repeat(5_000).as_str());
    c.bench_function("generate/largetext_100k", |b| {
        b.iter(|| {
            let mut writer = JsonWriter::to_text(&compact());
            writer.open_object().unwrap();
            writer.write_largetext("body", black_box(&body)).unwrap();
            black_box(writer.into_output().unwrap())
        });
    });
}

fn bench_rowset_items(c: &mut Criterion) {
    let rows = people(1_000);
    let links = vec![Link::new("/people/#ID#", "self")];
    c.bench_function("generate/rowset_1000", |b| {
        b.iter(|| {
            let mut writer = JsonWriter::to_text(&compact());
            writer.append_rowset(black_box(&rows)).unwrap();
            black_box(writer.into_output().unwrap())
        });
    });
    c.bench_function("generate/items_with_links_1000", |b| {
        b.iter(|| {
            let mut writer = JsonWriter::to_text(&compact());
            writer.open_object().unwrap();
            writer.write_items(black_box(&rows), &links).unwrap();
            black_box(writer.into_output().unwrap())
        });
    });
}

fn bench_subtree_reemission(c: &mut Criterion) {
    let mut source = String::from("{\"rows\": [");
    for index in 0..1_000 {
        if index > 0 {
            source.push(',');
        }
        source.push_str(&format!("{{\"id\": {index}, \"tags\": [1, 2, 3]}}"));
    }
    source.push_str("]}");
    let table = flatjson::parse(&source).unwrap();
    c.bench_function("generate/subtree_1000", |b| {
        b.iter(|| {
            let mut writer = JsonWriter::to_text(&compact());
            writer.append_subtree(black_box(&table), ".").unwrap();
            black_box(writer.into_output().unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_scalar_writes,
    bench_escaping,
    bench_largetext_streaming,
    bench_rowset_items,
    bench_subtree_reemission
);
criterion_main!(benches);
