use crate::tokenizer::tokenize;
use std::collections::{BTreeMap, HashMap, HashSet};

pub type DocId = String;
/// Zero-based, strictly increasing token positions of one term in one document.
pub type Positions = Vec<usize>;
/// Postings of a single term: document id -> positions.
pub type DocPostings = BTreeMap<DocId, Positions>;

static EMPTY_POSTINGS: DocPostings = BTreeMap::new();

/// Positional inverted index over a set of raw text documents.
///
/// A term key is present only while at least one document has a non-empty
/// position list for it. Lookups never insert.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InvertedIndex {
    pub(crate) index: HashMap<String, DocPostings>,
    pub(crate) documents: HashMap<DocId, String>,
    pub(crate) doc_lengths: HashMap<DocId, usize>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Index `content` under `doc_id`. Re-adding an id first drops every
    /// posting the previous content contributed.
    pub fn add_document(&mut self, doc_id: &str, content: &str) {
        let replaced = self.remove_postings(doc_id);

        let tokens = tokenize(content);
        let doc_len = tokens.len();
        for (pos, term) in tokens.into_iter().enumerate() {
            self.index
                .entry(term)
                .or_default()
                .entry(doc_id.to_string())
                .or_default()
                .push(pos);
        }
        self.documents.insert(doc_id.to_string(), content.to_string());
        self.doc_lengths.insert(doc_id.to_string(), doc_len);
        tracing::debug!(doc_id, doc_len, replaced, "indexed document");
    }

    /// Add every `(id, content)` pair. The final state does not depend on
    /// iteration order.
    pub fn build_from_documents<I, K, V>(&mut self, docs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (doc_id, content) in docs {
            self.add_document(doc_id.as_ref(), content.as_ref());
        }
        tracing::info!(num_docs = self.num_docs(), num_terms = self.num_terms(), "index build complete");
    }

    /// Remove all postings attributed to `doc_id`, using its stored content to
    /// find the affected terms. Returns whether the document existed.
    fn remove_postings(&mut self, doc_id: &str) -> bool {
        let Some(old) = self.documents.get(doc_id) else { return false };
        let old_terms: HashSet<String> = tokenize(old).into_iter().collect();
        for term in old_terms {
            if let Some(postings) = self.index.get_mut(&term) {
                postings.remove(doc_id);
                if postings.is_empty() {
                    self.index.remove(&term);
                }
            }
        }
        true
    }

    /// Postings of an already-normalized term, or an empty map.
    pub fn postings(&self, term: &str) -> &DocPostings {
        self.index.get(term).unwrap_or(&EMPTY_POSTINGS)
    }

    /// Positions of an already-normalized term in one document, or an empty slice.
    pub fn positions(&self, term: &str, doc_id: &str) -> &[usize] {
        self.index
            .get(term)
            .and_then(|p| p.get(doc_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn document(&self, doc_id: &str) -> Option<&str> {
        self.documents.get(doc_id).map(String::as_str)
    }

    /// Number of indexed tokens the document produced.
    pub fn doc_length(&self, doc_id: &str) -> Option<usize> {
        self.doc_lengths.get(doc_id).copied()
    }

    pub fn contains_document(&self, doc_id: &str) -> bool { self.documents.contains_key(doc_id) }

    pub fn doc_ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn documents(&self) -> impl Iterator<Item = (&str, &str)> {
        self.documents.iter().map(|(id, c)| (id.as_str(), c.as_str()))
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &DocPostings)> {
        self.index.iter().map(|(t, p)| (t.as_str(), p))
    }

    pub fn num_docs(&self) -> usize { self.documents.len() }
    pub fn num_terms(&self) -> usize { self.index.len() }
}
