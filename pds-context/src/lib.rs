//! Context entities of the Planetary Data System and the fuzzy index used to
//! resolve human-readable names (possibly misspelled) to their LIDs.

mod catalog;
mod entity;
mod errors;
mod index;

pub use catalog::ContextCatalog;
pub use entity::{CatalogEntity, EntityCategory};
pub use errors::ContextError;
pub use index::{ContextIndex, ContextMatch, DEFAULT_SEARCH_LIMIT, MIN_SIMILARITY};
