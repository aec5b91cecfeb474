//! Spell compendium importer.
//!
//! `normalize` turns one raw `<spell>` entry into a storage-ready record plus
//! its class links. The other modules read the compendium, apply the batch
//! failure policy and write to SQLite.

pub mod compendium;
pub mod db;
pub mod error;
pub mod import;
pub mod normalize;
pub mod settings;

pub use error::ConvertError;
pub use normalize::{normalize, Normalized, NormalizedSpell, Normalizer, RawEntry};
