use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use shabdakosh::{DefinitionBlock, DictionaryIndex, Entry, Linker};

const HEADWORDS: &[&str] = &[
    "काम", "श्रम", "किताब", "घरबार", "मानिस", "पानी", "बाटो", "गाउँ", "शहर", "विद्यालय",
    "शिक्षक", "विद्यार्थी", "खेती", "किसान", "बजार", "नदी", "पहाड", "हिमाल", "जङ्गल", "रुख",
];

const SENSES: &[(&str, &str)] = &[
    ("short", "कामको मेहनत"),
    (
        "sentence",
        "गाउँका किसानहरू बिहानैदेखि खेतमा काम गर्छन् र बेलुका बजारबाट घर फर्कन्छन्।",
    ),
    (
        "paragraph",
        "हिमालदेखि नदीसम्म फैलिएको जङ्गलमा रुखहरू छन्; मानिसहरू बाटोमा हिँड्छन्, \
         विद्यार्थीले विद्यालयमा किताब पढ्छन्, शिक्षकले शहरका बालबालिकालाई पढाउँछन्, \
         र पानी पहाडबाट गाउँतिर बग्छ।",
    ),
];

fn build_index() -> DictionaryIndex {
    let entries: Vec<Entry> = HEADWORDS
        .iter()
        .map(|word| Entry {
            word: word.to_string(),
            definitions: vec![DefinitionBlock::default()],
        })
        .collect();
    DictionaryIndex::build(&entries).expect("bench index")
}

fn bench_link_text(c: &mut Criterion) {
    let index = build_index();
    let linker = Linker::new(&index);
    let mut group = c.benchmark_group("link_text");
    for &(label, sense) in SENSES {
        group.throughput(Throughput::Bytes(sense.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(label), &sense, |b, &sense| {
            b.iter(|| black_box(linker.link_text(black_box(sense), Some("काम"))));
        });
    }
    group.finish();
}

fn bench_index_build(c: &mut Criterion) {
    c.bench_function("index_build", |b| {
        b.iter(|| black_box(build_index().len()));
    });
}

criterion_group!(benches, bench_link_text, bench_index_build);
criterion_main!(benches);
