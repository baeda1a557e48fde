use crate::builder::QueryBuilder;
use crate::config::RegistryConfig;
use crate::errors::QueryError;
use crate::http::HttpTransport;
use crate::scope::Scope;
use crate::transport::RegistryTransport;
use pds_context::{ContextCatalog, ContextIndex, EntityCategory};
use std::sync::Arc;

/// Entry point: a transport plus the lazily built context indexes.
///
/// Cloning is cheap and clones share both the transport and the indexes.
#[derive(Clone)]
pub struct RegistryClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn RegistryTransport>,
    contexts: ContextCatalog,
}

impl RegistryClient {
    pub fn new(transport: impl RegistryTransport + 'static) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    pub fn from_arc(transport: Arc<dyn RegistryTransport>) -> Self {
        Self::with_context_catalog(transport, ContextCatalog::new())
    }

    /// Client whose context indexes are (partly) known up front
    pub fn with_context_catalog(
        transport: Arc<dyn RegistryTransport>,
        contexts: ContextCatalog,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                contexts,
            }),
        }
    }

    /// Client talking to the PDS Search API over HTTP
    pub fn connect(config: &RegistryConfig) -> Result<Self, QueryError> {
        Ok(Self::new(HttpTransport::new(config)?))
    }

    /// Builder over all products of the registry
    pub fn products(&self) -> QueryBuilder {
        QueryBuilder::new(self.clone())
    }

    /// Builder limited to OSIRIS-REx products
    pub fn orex_products(&self) -> QueryBuilder {
        self.products().scoped(Scope::orex())
    }

    /// Index of one category, listed from the registry on first use
    pub fn context_index(&self, category: EntityCategory) -> Result<Arc<ContextIndex>, QueryError> {
        self.inner.contexts.get_or_build(category, || -> Result<_, QueryError> {
            let entities = self.inner.transport.list_entities(category)?;
            Ok(ContextIndex::build(category, entities)?)
        })
    }

    pub fn targets(&self) -> Result<Arc<ContextIndex>, QueryError> {
        self.context_index(EntityCategory::Target)
    }

    pub fn instrument_hosts(&self) -> Result<Arc<ContextIndex>, QueryError> {
        self.context_index(EntityCategory::InstrumentHost)
    }

    pub fn instruments(&self) -> Result<Arc<ContextIndex>, QueryError> {
        self.context_index(EntityCategory::Instrument)
    }

    pub fn investigations(&self) -> Result<Arc<ContextIndex>, QueryError> {
        self.context_index(EntityCategory::Investigation)
    }

    pub(crate) fn transport(&self) -> Arc<dyn RegistryTransport> {
        Arc::clone(&self.inner.transport)
    }
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("loaded_contexts", &self.inner.contexts.loaded())
            .finish_non_exhaustive()
    }
}
