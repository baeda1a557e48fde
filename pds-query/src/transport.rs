use crate::errors::TransportError;
use crate::record::ProductRecord;
use pds_context::{CatalogEntity, EntityCategory};

/// Opaque backend-issued marker for the next page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of results; `next_token` is absent on the last page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub records: Vec<ProductRecord>,
    pub next_token: Option<ContinuationToken>,
}

impl Page {
    pub fn last(records: Vec<ProductRecord>) -> Self {
        Self {
            records,
            next_token: None,
        }
    }

    pub fn with_next(records: Vec<ProductRecord>, token: ContinuationToken) -> Self {
        Self {
            records,
            next_token: Some(token),
        }
    }
}

/// Synchronous access to the registry.
///
/// Implementations own page size, timeouts and retries. Re-invoking
/// `execute_page` with the same token must return the same page.
pub trait RegistryTransport: Send + Sync {
    /// Fetch one page of `query` (`None` matches everything), restricted to
    /// `fields` when non-empty.
    fn execute_page(
        &self,
        query: Option<&str>,
        token: Option<&ContinuationToken>,
        fields: &[String],
    ) -> Result<Page, TransportError>;

    /// All context entities of one category, in a single call
    fn list_entities(&self, category: EntityCategory) -> Result<Vec<CatalogEntity>, TransportError>;
}
