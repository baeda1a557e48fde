//! Query builder and paginated result cursor over the PDS Search API.
//!
//! A [`QueryBuilder`] accumulates filters and compiles them into the
//! registry's query language. Iterating it (or calling
//! [`QueryBuilder::as_dataframe`]) drives a [`ResultCursor`] that requests
//! one page at a time through a [`RegistryTransport`].
//!
//! ```no_run
//! use pds_query::{RegistryClient, RegistryConfig};
//!
//! # fn main() -> Result<(), pds_query::QueryError> {
//! let client = RegistryClient::connect(&RegistryConfig::default().with_env_overrides())?;
//! let products = client.products().has_target("Mars")?.observationals().limit(20);
//! for product in &products {
//!     println!("{}", product?.id);
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod client;
mod config;
mod cursor;
mod errors;
mod expression;
mod frame;
mod http;
mod query;
mod record;
mod scope;
mod transport;

pub use builder::{
    looks_like_identifier, reference_field, BuilderWarning, QueryBuilder, COLLECTION_FIELD,
    PROCESSING_LEVEL_FIELD, START_TIME_FIELD,
};
pub use client::RegistryClient;
pub use config::{RegistryConfig, BASE_URL_ENV};
pub use cursor::{CursorPhase, ResultCursor};
pub use errors::{QueryError, TransportError};
pub use expression::{FilterExpression, FilterValue, Operator, Predicate};
pub use frame::ProductFrame;
pub use http::HttpTransport;
pub use query::{ProcessingLevel, ProductClass, QuerySpec};
pub use record::{ProductRecord, PropertyMap};
pub use scope::{Scope, SpatialProfile, OREX_INVESTIGATION};
pub use transport::{ContinuationToken, Page, RegistryTransport};

pub use pds_context::{CatalogEntity, ContextIndex, ContextMatch, EntityCategory};
