use criterion::{criterion_group, criterion_main, Criterion};
use sitesearch_core::tokenizer::tokenize;

fn bench_tokenize(c: &mut Criterion) {
    let text = "The platypus is a semiaquatic, egg-laying mammal endemic to eastern Australia. \
                Together with the four species of echidna, it is one of the five extant species of monotremes. "
        .repeat(64);
    c.bench_function("tokenize_page_body", |b| b.iter(|| tokenize(&text)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
