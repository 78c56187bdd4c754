//! Concrete backend implementations.

pub mod memjournal;

pub use memjournal::{MemJournalBackend, MemJournalConfig};
