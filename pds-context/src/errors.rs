use crate::entity::EntityCategory;

/// Error types for building and querying context indexes
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContextError {
    #[error("Unknown entity category: {0}")]
    UnknownCategory(String),
    #[error("Entity {identifier} is a {found}, expected a {expected}")]
    CategoryMismatch {
        identifier: String,
        expected: EntityCategory,
        found: EntityCategory,
    },
}
