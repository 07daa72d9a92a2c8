use criterion::{criterion_group, criterion_main, Criterion};
use invindex::tokenizer::tokenize;
use invindex::InvertedIndex;

const TEXT: &str = "Search engines use an inverted index for fast information retrieval. \
An inverted index is a database index storing a mapping from content, such as words or numbers, \
to its locations in a document or a set of documents.";

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_paragraph", |b| b.iter(|| tokenize(TEXT)));
}

fn bench_phrase(c: &mut Criterion) {
    let mut index = InvertedIndex::new();
    for i in 0..1000 {
        index.add_document(&format!("doc{i}"), &format!("{TEXT} document number {i}"));
    }
    c.bench_function("phrase_inverted_index", |b| b.iter(|| index.search_phrase("inverted index storing")));
}

criterion_group!(benches, bench_tokenize, bench_phrase);
criterion_main!(benches);
