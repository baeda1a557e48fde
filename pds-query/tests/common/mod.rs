//! Common test utilities for the pds-query crate

#![allow(dead_code)]

use pds_query::{
    CatalogEntity, ContinuationToken, EntityCategory, Page, ProductRecord, RegistryClient,
    RegistryTransport, TransportError,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One `execute_page` invocation as seen by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct PageCall {
    pub query: Option<String>,
    pub token: Option<String>,
    pub fields: Vec<String>,
}

/// In-memory registry serving fixed pages.
///
/// Page `n` (zero-based) is requested with token `page-n`; every page but the
/// last carries the token of the next one.
#[derive(Default)]
pub struct ScriptedTransport {
    pages: Vec<Vec<ProductRecord>>,
    entities: HashMap<EntityCategory, Vec<CatalogEntity>>,
    fail_on_page: Option<usize>,
    calls: Mutex<Vec<PageCall>>,
    listings: Mutex<Vec<EntityCategory>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, pages: Vec<Vec<ProductRecord>>) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_entities(mut self, category: EntityCategory, entities: Vec<CatalogEntity>) -> Self {
        self.entities.insert(category, entities);
        self
    }

    /// Answer page `n` with an HTTP 503
    pub fn failing_on_page(mut self, n: usize) -> Self {
        self.fail_on_page = Some(n);
        self
    }

    pub fn calls(&self) -> Vec<PageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn listings(&self) -> Vec<EntityCategory> {
        self.listings.lock().unwrap().clone()
    }
}

impl RegistryTransport for ScriptedTransport {
    fn execute_page(
        &self,
        query: Option<&str>,
        token: Option<&ContinuationToken>,
        fields: &[String],
    ) -> Result<Page, TransportError> {
        self.calls.lock().unwrap().push(PageCall {
            query: query.map(str::to_string),
            token: token.map(|t| t.as_str().to_string()),
            fields: fields.to_vec(),
        });

        let index = match token {
            None => 0,
            Some(token) => token
                .as_str()
                .strip_prefix("page-")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| TransportError::Http {
                    status: 400,
                    message: format!("bad search-after {}", token),
                })?,
        };
        if self.fail_on_page == Some(index) {
            return Err(TransportError::Http {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }

        let records = self.pages.get(index).cloned().unwrap_or_default();
        if index + 1 < self.pages.len() {
            Ok(Page::with_next(
                records,
                ContinuationToken::new(format!("page-{}", index + 1)),
            ))
        } else {
            Ok(Page::last(records))
        }
    }

    fn list_entities(&self, category: EntityCategory) -> Result<Vec<CatalogEntity>, TransportError> {
        self.listings.lock().unwrap().push(category);
        Ok(self.entities.get(&category).cloned().unwrap_or_default())
    }
}

pub fn client(transport: &Arc<ScriptedTransport>) -> RegistryClient {
    RegistryClient::from_arc(transport.clone())
}

pub fn product(n: usize) -> ProductRecord {
    ProductRecord::new(format!(
        "urn:nasa:pds:mars2020_mastcamz_sci_calibrated:data:zl0_{:04}::1.0",
        n
    ))
    .with_type("Product_Observational")
    .with_property("ref_lid_target", ["urn:nasa:pds:context:target:planet.mars"])
}

/// Products numbered consecutively from 1, split into pages of the given sizes
pub fn paged_products(sizes: &[usize]) -> Vec<Vec<ProductRecord>> {
    let mut n = 0;
    sizes
        .iter()
        .map(|size| {
            (0..*size)
                .map(|_| {
                    n += 1;
                    product(n)
                })
                .collect()
        })
        .collect()
}

pub fn mars_targets() -> Vec<CatalogEntity> {
    [
        ("planet.mars", "Mars", "Planet"),
        ("asteroid.marsha", "Marsha", "Asteroid"),
        ("satellite.mars.phobos", "Phobos", "Satellite"),
        ("satellite.mars.deimos", "Deimos", "Satellite"),
        ("asteroid.101955_bennu", "(101955) Bennu", "Asteroid"),
    ]
    .into_iter()
    .map(|(tail, name, kind)| {
        CatalogEntity::new(
            format!("urn:nasa:pds:context:target:{}", tail),
            name,
            EntityCategory::Target,
        )
        .with_kind(kind)
    })
    .collect()
}

pub fn ids(records: &[ProductRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
