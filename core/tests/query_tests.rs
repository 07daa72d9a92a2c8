use invindex::InvertedIndex;
use std::collections::HashSet;

fn corpus() -> InvertedIndex {
    let mut index = InvertedIndex::new();
    index.build_from_documents([
        ("doc1", "Information retrieval is important"),
        ("doc2", "Search engines use inverted index"),
        ("doc3", "Inverted index enables fast search"),
        ("doc4", "Database systems use index structures"),
    ]);
    index
}

fn ids(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn single_term_search() {
    let index = corpus();
    let result = index.search("index");
    let docs: HashSet<String> = result.keys().cloned().collect();
    assert_eq!(docs, ids(&["doc2", "doc3", "doc4"]));
    assert_eq!(result["doc2"], vec![4]);
    assert_eq!(result["doc3"], vec![1]);
}

#[test]
fn search_is_case_insensitive() {
    let index = corpus();
    assert_eq!(index.search("INDEX"), index.search("index"));
}

#[test]
fn search_uses_only_first_term() {
    let index = corpus();
    assert_eq!(index.search("database inverted"), index.search("database"));
    assert_eq!(index.search("the database"), index.search("database"));
    assert_eq!(index.term_frequency("index search", "doc3"), 1);
    assert_eq!(index.document_frequency("fast index"), 1);
}

#[test]
fn stopwords_and_empty_input_find_nothing() {
    let index = corpus();
    assert!(index.search("is").is_empty());
    assert!(index.search("").is_empty());
    assert!(index.search_and::<&str>(&[]).is_empty());
    assert!(index.search_or::<&str>(&[]).is_empty());
    assert!(index.search_phrase("").is_empty());
    assert_eq!(index.document_frequency("the"), 0);
    assert_eq!(index.term_frequency("", "doc1"), 0);
}

#[test]
fn and_query() {
    let index = corpus();
    assert_eq!(index.search_and(&["inverted", "index"]), ids(&["doc2", "doc3"]));
    assert_eq!(index.search_and(&["inverted index"]), ids(&["doc2", "doc3"]));
    assert!(index.search_and(&["inverted", "nonexistent"]).is_empty());
}

#[test]
fn and_equals_intersection_of_single_searches() {
    let index = corpus();
    let terms = ["search", "use", "index"];
    let mut expected: Option<HashSet<String>> = None;
    for t in terms {
        let docs: HashSet<String> = index.search(t).into_keys().collect();
        expected = Some(match expected {
            Some(acc) => acc.intersection(&docs).cloned().collect(),
            None => docs,
        });
    }
    assert_eq!(index.search_and(&terms), expected.unwrap());
}

#[test]
fn or_query() {
    let index = corpus();
    assert_eq!(index.search_or(&["search", "database"]), ids(&["doc2", "doc3", "doc4"]));
    assert_eq!(index.search_or(&["information", "nonexistent"]), ids(&["doc1"]));
}

#[test]
fn not_query() {
    let index = corpus();
    assert_eq!(index.search_not(&["index"], &["database"]), ids(&["doc2", "doc3"]));
    assert_eq!(index.search_not::<&str, _>(&[], &["index"]), ids(&["doc1"]));
    assert_eq!(index.search_not::<_, &str>(&["inverted"], &[]), index.search_and(&["inverted"]));
    assert_eq!(index.search_not::<&str, &str>(&[], &[]), ids(&["doc1", "doc2", "doc3", "doc4"]));
}

#[test]
fn phrase_query_is_order_sensitive() {
    let index = corpus();
    assert_eq!(index.search_phrase("inverted index"), ids(&["doc2", "doc3"]));
    assert!(index.search_phrase("index inverted").is_empty());
    assert_eq!(index.search_phrase("Inverted Index enables"), ids(&["doc3"]));
    assert_eq!(index.search_phrase("index"), ids(&["doc2", "doc3", "doc4"]));
}

#[test]
fn phrase_requires_adjacency() {
    let index = corpus();
    // both terms occur in doc3 but not next to each other
    assert!(index.search_phrase("inverted search").is_empty());
}

#[test]
fn frequencies() {
    let index = corpus();
    assert_eq!(index.document_frequency("index"), 3);
    assert_eq!(index.document_frequency("information"), 1);
    assert_eq!(index.term_frequency("index", "doc2"), 1);
    assert_eq!(index.term_frequency("nonexistent", "doc1"), 0);
    assert_eq!(index.term_frequency("index", "doc1"), 0);
    assert_eq!(index.term_frequency("index", "doc99"), 0);
}

#[test]
fn every_indexed_token_finds_its_document() {
    let index = corpus();
    for (doc_id, content) in index.documents() {
        for token in invindex::tokenizer::tokenize(content) {
            assert!(index.search(&token).contains_key(doc_id), "{token} missing from {doc_id}");
        }
    }
}

#[test]
fn queries_do_not_mutate() {
    let index = corpus();
    let before = index.clone();
    let _ = index.search("unknown");
    let _ = index.search_and(&["unknown", "index"]);
    let _ = index.search_phrase("unknown index");
    let _ = index.term_frequency("unknown", "nodoc");
    assert_eq!(index, before);
}

#[test]
fn readding_document_replaces_it() {
    let mut index = corpus();
    index.add_document("doc2", "Database engines");
    assert_eq!(index.search_phrase("inverted index"), ids(&["doc3"]));
    assert_eq!(index.document_frequency("database"), 2);
    assert_eq!(index.doc_length("doc2"), Some(2));
    assert_eq!(index.num_docs(), 4);
}
