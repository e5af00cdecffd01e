#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion, Throughput};
use hanseg::{PosSegmenter, Segmenter, TagExtractor, TextRanker};
use lazy_static::lazy_static;

lazy_static! {
    static ref SEGMENTER: Segmenter = Segmenter::new();
    static ref POS_SEGMENTER: PosSegmenter = PosSegmenter::new();
    static ref TAG_EXTRACTOR: TagExtractor<'static> = TagExtractor::new_with_segmenter(&SEGMENTER);
    static ref TEXT_RANKER: TextRanker<'static> = TextRanker::new_with_segmenter(&POS_SEGMENTER);
}

static SENTENCE: &str = "我是拖拉机学院手扶拖拉机专业的。不用多久，我就会升职加薪，走上人生巅峰。";

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("hanseg");
    let dict_len = include_bytes!("../src/data/dict.txt").len() as u64;
    group.throughput(Throughput::Bytes(dict_len));
    group.bench_function("new", |b| {
        b.iter(|| {
            black_box(Segmenter::new());
        })
    });
    group.finish();

    let mut group = c.benchmark_group("cut");
    group.throughput(Throughput::Bytes(SENTENCE.len() as u64));
    group.bench_function("no-hmm", |b| b.iter(|| SEGMENTER.cut(black_box(SENTENCE), false)));
    group.bench_function("with-hmm", |b| b.iter(|| SEGMENTER.cut(black_box(SENTENCE), true)));
    group.bench_function("cut_all", |b| b.iter(|| SEGMENTER.cut_all(black_box(SENTENCE))));
    group.bench_function("cut_for_search", |b| {
        b.iter(|| SEGMENTER.cut_for_search(black_box(SENTENCE), true))
    });
    group.finish();

    let mut group = c.benchmark_group("posseg");
    group.throughput(Throughput::Bytes(SENTENCE.len() as u64));
    group.bench_function("with-hmm", |b| b.iter(|| POS_SEGMENTER.cut(black_box(SENTENCE), true)));
    group.bench_function("no-hmm", |b| b.iter(|| POS_SEGMENTER.cut(black_box(SENTENCE), false)));
    group.finish();

    let mut group = c.benchmark_group("extract-keywords");
    group.throughput(Throughput::Bytes(SENTENCE.len() as u64));
    group.bench_function("tfidf", |b| {
        b.iter(|| TAG_EXTRACTOR.extract_tags(black_box(SENTENCE), 3))
    });
    group.bench_function("textrank", |b| {
        b.iter(|| TEXT_RANKER.text_rank(black_box(SENTENCE), 3))
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
