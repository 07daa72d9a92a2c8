use crate::error::PersistError;
use crate::index::{DocId, DocPostings, InvertedIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub type Result<T> = std::result::Result<T, PersistError>;

/// Flat, self-contained form of an index. All three keys are required on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub index: HashMap<String, DocPostings>,
    pub documents: HashMap<DocId, String>,
    pub doc_lengths: HashMap<DocId, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Pretty-printed JSON record.
    #[default]
    Json,
    /// bincode-encoded record.
    Binary,
}

impl Format {
    /// `.bin` files are binary, everything else JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|s| s.to_str()) {
            Some("bin") => Format::Binary,
            _ => Format::Json,
        }
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "bin" | "binary" => Ok(Format::Binary),
            other => Err(format!("unknown format '{other}', expected json or binary")),
        }
    }
}

impl InvertedIndex {
    pub fn to_record(&self) -> IndexRecord {
        IndexRecord {
            index: self.index.clone(),
            documents: self.documents.clone(),
            doc_lengths: self.doc_lengths.clone(),
        }
    }

    /// Rebuild an index from a record, rejecting records that describe an
    /// inconsistent index. Terms or postings with no positions are dropped.
    pub fn from_record(record: IndexRecord) -> Result<Self> {
        let IndexRecord { index, documents, doc_lengths } = record;

        if documents.len() != doc_lengths.len() || documents.keys().any(|id| !doc_lengths.contains_key(id)) {
            return Err(PersistError::InvalidRecord(
                "documents and doc_lengths describe different document sets".into(),
            ));
        }

        let mut kept: HashMap<String, DocPostings> = HashMap::with_capacity(index.len());
        let mut dropped = 0usize;
        for (term, mut postings) in index {
            postings.retain(|_, positions| !positions.is_empty());
            if postings.is_empty() {
                dropped += 1;
                continue;
            }
            for (doc_id, positions) in &postings {
                let Some(&doc_len) = doc_lengths.get(doc_id) else {
                    return Err(PersistError::InvalidRecord(format!(
                        "term '{term}' references unknown document '{doc_id}'"
                    )));
                };
                if positions.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(PersistError::InvalidRecord(format!(
                        "positions of '{term}' in '{doc_id}' are not strictly increasing"
                    )));
                }
                // sorted, so the last position is the largest
                if positions.last().is_some_and(|&last| last >= doc_len) {
                    return Err(PersistError::InvalidRecord(format!(
                        "positions of '{term}' in '{doc_id}' exceed its length {doc_len}"
                    )));
                }
            }
            kept.insert(term, postings);
        }
        if dropped > 0 {
            tracing::warn!(dropped, "dropped terms without postings from loaded record");
        }

        Ok(InvertedIndex { index: kept, documents, doc_lengths })
    }
}

pub fn to_json(index: &InvertedIndex) -> Result<String> {
    Ok(serde_json::to_string_pretty(&index.to_record())?)
}

pub fn from_json(json: &str) -> Result<InvertedIndex> {
    let record: IndexRecord = serde_json::from_str(json)?;
    InvertedIndex::from_record(record)
}

pub fn to_bytes(index: &InvertedIndex) -> Result<Vec<u8>> {
    Ok(bincode::serialize(&index.to_record())?)
}

pub fn from_bytes(bytes: &[u8]) -> Result<InvertedIndex> {
    let record: IndexRecord = bincode::deserialize(bytes)?;
    InvertedIndex::from_record(record)
}

pub fn save_index<P: AsRef<Path>>(path: P, index: &InvertedIndex, format: Format) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut f = BufWriter::new(File::create(path)?);
    match format {
        Format::Json => serde_json::to_writer_pretty(&mut f, &index.to_record())?,
        Format::Binary => f.write_all(&to_bytes(index)?)?,
    }
    f.flush()?;
    tracing::info!(path = %path.display(), ?format, num_docs = index.num_docs(), num_terms = index.num_terms(), "saved index");
    Ok(())
}

pub fn load_index<P: AsRef<Path>>(path: P, format: Format) -> Result<InvertedIndex> {
    let path = path.as_ref();
    let mut f = BufReader::new(File::open(path)?);
    let index = match format {
        Format::Json => {
            let record: IndexRecord = serde_json::from_reader(f)?;
            InvertedIndex::from_record(record)?
        }
        Format::Binary => {
            let mut buf = Vec::new();
            f.read_to_end(&mut buf)?;
            from_bytes(&buf)?
        }
    };
    tracing::info!(path = %path.display(), ?format, num_docs = index.num_docs(), num_terms = index.num_terms(), "loaded index");
    Ok(index)
}
