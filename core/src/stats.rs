//! Summary statistics and a sorted structure dump for reporting.

use crate::index::{DocId, InvertedIndex, Positions};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    pub num_docs: usize,
    pub num_terms: usize,
    pub total_tokens: usize,
    pub avg_doc_length: f64,
    /// (term, document frequency), most frequent first.
    pub top_terms: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermEntry {
    pub term: String,
    pub doc_frequency: usize,
    /// Sorted by document id.
    pub postings: Vec<(DocId, Positions)>,
}

impl InvertedIndex {
    pub fn stats(&self, top_n: usize) -> IndexStats {
        let total_tokens: usize = self.doc_lengths.values().sum();
        let avg_doc_length = if self.doc_lengths.is_empty() {
            0.0
        } else {
            total_tokens as f64 / self.doc_lengths.len() as f64
        };

        let mut top_terms: Vec<(String, usize)> = self
            .terms()
            .map(|(term, postings)| (term.to_string(), postings.len()))
            .collect();
        top_terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_terms.truncate(top_n);

        IndexStats { num_docs: self.num_docs(), num_terms: self.num_terms(), total_tokens, avg_doc_length, top_terms }
    }

    pub fn dump(&self) -> Vec<TermEntry> {
        let mut entries: Vec<TermEntry> = self
            .terms()
            .map(|(term, postings)| TermEntry {
                term: term.to_string(),
                doc_frequency: postings.len(),
                postings: postings.iter().map(|(d, p)| (d.clone(), p.clone())).collect(),
            })
            .collect();
        entries.sort_by(|a, b| a.term.cmp(&b.term));
        entries
    }
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "documents: {}", self.num_docs)?;
        writeln!(f, "terms: {}", self.num_terms)?;
        writeln!(f, "tokens: {}", self.total_tokens)?;
        writeln!(f, "average document length: {:.2}", self.avg_doc_length)?;
        if !self.top_terms.is_empty() {
            writeln!(f, "top terms by document frequency:")?;
            for (term, df) in &self.top_terms {
                writeln!(f, "  {term}: {df}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for TermEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (df={})", self.term, self.doc_frequency)?;
        for (doc_id, positions) in &self.postings {
            writeln!(f, "  {doc_id}: tf={} positions={positions:?}", positions.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_of_empty_index() {
        let s = InvertedIndex::new().stats(10);
        assert_eq!(s.num_docs, 0);
        assert_eq!(s.avg_doc_length, 0.0);
        assert!(s.top_terms.is_empty());
    }

    #[test]
    fn stats_and_dump() {
        let mut idx = InvertedIndex::new();
        idx.build_from_documents([("d2", "beta alpha"), ("d1", "alpha alpha gamma")]);
        let s = idx.stats(2);
        assert_eq!(s.total_tokens, 5);
        assert_eq!(s.avg_doc_length, 2.5);
        assert_eq!(s.top_terms, vec![("alpha".to_string(), 2), ("beta".to_string(), 1)]);

        let dump = idx.dump();
        let terms: Vec<&str> = dump.iter().map(|e| e.term.as_str()).collect();
        assert_eq!(terms, vec!["alpha", "beta", "gamma"]);
        assert_eq!(dump[0].postings, vec![("d1".to_string(), vec![0, 1]), ("d2".to_string(), vec![1])]);
        assert!(dump[0].to_string().contains("d1: tf=2 positions=[0, 1]"));
    }
}
