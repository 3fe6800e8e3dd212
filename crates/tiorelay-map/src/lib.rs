//! Direction-scoped message key translation.
//!
//! Messages crossing the relay look like `key=value` (or a bare `key`). Each
//! direction owns a [`TranslationTable`] that swaps the key for a substitute
//! while carrying the `=value` suffix through untouched. Unknown keys pass
//! through unchanged.
//!
//! Tables are seeded from a line-oriented translation file, see [`loader`].

pub mod error;
pub mod loader;
pub mod table;

pub use error::{MapError, Result};
pub use loader::{load_from_path, load_from_reader, parse_line, MapEntry};
pub use table::{Direction, TranslationTable, TranslationTables};
