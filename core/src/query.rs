//! Read-only query operations over an [`InvertedIndex`].
//!
//! Unknown terms and documents are not errors: they produce empty sets or
//! zero counts. Input strings go through the same tokenizer as documents, so
//! stopword-only input behaves like empty input.

use crate::index::{DocId, DocPostings, InvertedIndex};
use crate::tokenizer::{first_term, tokenize, tokenize_all};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

impl InvertedIndex {
    /// Postings of the first term `term` normalizes to. The rest of a
    /// multi-word input is ignored.
    pub fn search(&self, term: &str) -> DocPostings {
        match first_term(term) {
            Some(t) => self.postings(&t).clone(),
            None => DocPostings::new(),
        }
    }

    /// Documents containing every term. Empty input yields the empty set.
    pub fn search_and<S: AsRef<str>>(&self, terms: &[S]) -> HashSet<DocId> {
        let tokens = tokenize_all(terms);
        let Some((first, rest)) = tokens.split_first() else { return HashSet::new() };
        let mut result = self.doc_set(first);
        for term in rest {
            if result.is_empty() {
                break;
            }
            let postings = self.postings(term);
            result.retain(|doc_id| postings.contains_key(doc_id));
        }
        result
    }

    /// Documents containing at least one term.
    pub fn search_or<S: AsRef<str>>(&self, terms: &[S]) -> HashSet<DocId> {
        tokenize_all(terms)
            .iter()
            .flat_map(|term| self.postings(term).keys().cloned())
            .collect()
    }

    /// `search_and(include)` minus `search_or(exclude)`. An empty `include`
    /// list stands for every document; an empty `exclude` list removes nothing.
    pub fn search_not<S: AsRef<str>, T: AsRef<str>>(&self, include: &[S], exclude: &[T]) -> HashSet<DocId> {
        let mut result = if include.is_empty() {
            self.doc_ids().map(str::to_string).collect()
        } else {
            self.search_and(include)
        };
        if !result.is_empty() {
            for doc_id in self.search_or(exclude) {
                result.remove(&doc_id);
            }
        }
        result
    }

    /// Documents where the phrase's terms occur at consecutive positions in
    /// the given order.
    pub fn search_phrase(&self, phrase: &str) -> HashSet<DocId> {
        let tokens = tokenize(phrase);
        let Some((first, rest)) = tokens.split_first() else { return HashSet::new() };
        if rest.is_empty() {
            return self.doc_set(first);
        }
        let rest: Vec<&DocPostings> = rest.iter().map(|t| self.postings(t)).collect();
        if rest.iter().any(|p| p.is_empty()) {
            return HashSet::new();
        }

        self.postings(first)
            .iter()
            .filter(|(doc_id, starts)| {
                starts.iter().any(|&start| {
                    rest.iter().enumerate().all(|(i, postings)| {
                        postings
                            .get(doc_id.as_str())
                            .zip(start.checked_add(i + 1))
                            .is_some_and(|(positions, want)| positions.binary_search(&want).is_ok())
                    })
                })
            })
            .map(|(doc_id, _)| doc_id.clone())
            .collect()
    }

    /// Occurrences of the first normalized term of `term` in `doc_id`.
    pub fn term_frequency(&self, term: &str, doc_id: &str) -> usize {
        first_term(term).map_or(0, |t| self.positions(&t, doc_id).len())
    }

    /// Number of documents containing the first normalized term of `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        first_term(term).map_or(0, |t| self.postings(&t).len())
    }

    fn doc_set(&self, term: &str) -> HashSet<DocId> {
        self.postings(term).keys().cloned().collect()
    }
}

/// A query that can travel as JSON, e.g. `{"op": "and", "terms": ["inverted", "index"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Query {
    Term { term: String },
    And { terms: Vec<String> },
    Or { terms: Vec<String> },
    Not {
        #[serde(default)]
        include: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
    },
    Phrase { phrase: String },
}

impl Query {
    /// Matching document ids. `Term` yields the documents of its postings.
    pub fn execute(&self, index: &InvertedIndex) -> HashSet<DocId> {
        match self {
            Query::Term { term } => index.search(term).into_keys().collect(),
            Query::And { terms } => index.search_and(terms),
            Query::Or { terms } => index.search_or(terms),
            Query::Not { include, exclude } => index.search_not(include, exclude),
            Query::Phrase { phrase } => index.search_phrase(phrase),
        }
    }
}
