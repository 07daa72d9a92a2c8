use crate::index::InvertedIndex;
use crate::persist::{self, Format};
use crate::PersistError;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

/// Cloneable handle to an index shared between threads.
///
/// Queries take the read lock; adding documents, saving and loading take the
/// write lock for their whole duration, so readers never observe a document
/// whose old postings were cleared but whose new ones are not yet in place,
/// and snapshots never interleave with other operations.
#[derive(Clone, Default)]
pub struct SharedIndex {
    inner: Arc<RwLock<InvertedIndex>>,
}

impl SharedIndex {
    pub fn new(index: InvertedIndex) -> Self {
        Self { inner: Arc::new(RwLock::new(index)) }
    }

    pub fn with_read<R>(&self, f: impl FnOnce(&InvertedIndex) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn add_document(&self, doc_id: &str, content: &str) {
        self.inner.write().add_document(doc_id, content);
    }

    /// Adds the whole batch under one write lock.
    pub fn build_from_documents<I, K, V>(&self, docs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.inner.write().build_from_documents(docs);
    }

    pub fn save<P: AsRef<Path>>(&self, path: P, format: Format) -> Result<(), PersistError> {
        let guard = self.inner.write();
        persist::save_index(path, &guard, format)
    }

    /// Replace the current contents with a persisted index. On failure the
    /// current contents are left untouched.
    pub fn load<P: AsRef<Path>>(&self, path: P, format: Format) -> Result<(), PersistError> {
        let mut guard = self.inner.write();
        *guard = persist::load_index(path, format)?;
        Ok(())
    }
}
