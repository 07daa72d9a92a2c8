pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod shared;
pub mod stats;
pub mod tokenizer;

pub use error::PersistError;
pub use index::{DocId, DocPostings, InvertedIndex, Positions};
pub use persist::{Format, IndexRecord};
pub use query::Query;
pub use shared::SharedIndex;
pub use stats::{IndexStats, TermEntry};
