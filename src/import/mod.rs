//! Directory import.
//!
//! Loads categories, authors and entries from a JSON document into the
//! store. The FTS indexes follow automatically through the store's triggers.
//!
//! # Example
//!
//! ```ignore
//! use curate::import::import_file;
//! use curate::storage::Database;
//!
//! let db = Database::open("curate.db")?;
//! let report = import_file(&db, Path::new("directory.json"))?;
//! println!("{} entries, {} category links", report.entries, report.links);
//! ```

mod loader;
mod types;

pub use loader::{ImportReport, import_document, import_file};
pub use types::{AuthorDoc, CategoryDoc, CorpusDocument, EntryDoc};
