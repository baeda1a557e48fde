use crate::config::RegistryConfig;
use crate::errors::TransportError;
use crate::expression::{FilterExpression, Operator};
use crate::query::{ProductClass, QuerySpec};
use crate::record::ProductRecord;
use crate::transport::{ContinuationToken, Page, RegistryTransport};
use log::{debug, warn};
use pds_context::{CatalogEntity, EntityCategory};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    summary: Option<SearchSummary>,
    #[serde(default)]
    data: Vec<ProductRecord>,
}

#[derive(Debug, Deserialize)]
struct SearchSummary {
    #[serde(default)]
    hits: Option<i64>,
    /// Page size the server actually applied, which may be below the request
    #[serde(default)]
    limit: Option<i64>,
}

/// Transport over the PDS Search API `/products` endpoint.
///
/// Pages are ordered by the configured sort property and continued with
/// `search-after`, the token being that property's value on the last record
/// of a full page. A page is full when it holds as many records as the
/// server says it served per page, never more than the configured size.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    page_size: usize,
    sort_property: String,
}

impl HttpTransport {
    pub fn new(config: &RegistryConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size.max(1),
            sort_property: config.sort_property.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn products_url(&self) -> String {
        format!("{}/products", self.base_url)
    }

    fn query_params(
        &self,
        query: Option<&str>,
        token: Option<&ContinuationToken>,
        fields: &[String],
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("limit", self.page_size.to_string()),
            ("sort", self.sort_property.clone()),
        ];
        if let Some(query) = query {
            params.push(("q", format!("({})", query)));
        }
        if let Some(token) = token {
            params.push(("search-after", token.as_str().to_string()));
        }
        if !fields.is_empty() {
            // The sort property must come back to continue after the page
            let mut requested: Vec<&str> = fields.iter().map(String::as_str).collect();
            if !requested.contains(&self.sort_property.as_str()) {
                requested.push(&self.sort_property);
            }
            params.push(("fields", requested.join(",")));
        }
        params
    }

    fn continuation(
        &self,
        records: &[ProductRecord],
        served_limit: Option<i64>,
    ) -> Option<ContinuationToken> {
        let full_page = served_limit
            .and_then(|limit| usize::try_from(limit).ok())
            .filter(|limit| *limit > 0)
            .map_or(self.page_size, |limit| limit.min(self.page_size));
        if records.len() < full_page {
            return None;
        }
        let last = records.last()?;
        match last.first_text(&self.sort_property) {
            Some(value) => Some(ContinuationToken::new(value)),
            None => {
                warn!(
                    "Full page but record {} has no {}; stopping pagination",
                    last.id, self.sort_property
                );
                None
            }
        }
    }

    fn context_entity(category: EntityCategory, record: &ProductRecord) -> Option<CatalogEntity> {
        let name = record.first_text(&category.name_property())?;
        let mut entity = CatalogEntity::new(record.lid(), name, category);
        entity.kind = record.first_text(&category.type_property());
        entity.description = record
            .first_text(&category.description_property())
            .map(|d| d.split_whitespace().collect::<Vec<_>>().join(" "));
        Some(entity)
    }
}

impl RegistryTransport for HttpTransport {
    fn execute_page(
        &self,
        query: Option<&str>,
        token: Option<&ContinuationToken>,
        fields: &[String],
    ) -> Result<Page, TransportError> {
        let url = self.products_url();
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(&self.query_params(query, token, fields))
            .send()
            .map_err(|e| TransportError::Request(format!("GET {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(TransportError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response
            .json()
            .map_err(|e| TransportError::Decode(format!("GET {}: {}", url, e)))?;
        let (hits, served_limit) = body
            .summary
            .map_or((None, None), |summary| (summary.hits, summary.limit));
        debug!(
            "GET {} returned {} record(s) of {:?} hit(s)",
            url,
            body.data.len(),
            hits
        );
        if served_limit.is_some_and(|limit| limit > 0 && (limit as usize) < self.page_size) {
            debug!(
                "Server capped the page size at {:?} (requested {})",
                served_limit, self.page_size
            );
        }
        let next_token = self.continuation(&body.data, served_limit);
        Ok(Page {
            records: body.data,
            next_token,
        })
    }

    fn list_entities(&self, category: EntityCategory) -> Result<Vec<CatalogEntity>, TransportError> {
        let spec = QuerySpec {
            filter: FilterExpression::predicate(
                "lid",
                Operator::Like,
                format!("urn:nasa:pds:context:{}:*", category.lid_segment()),
            ),
            product_class: Some(ProductClass::Context),
            ..Default::default()
        };
        let query = spec.compile();
        let fields = vec![
            "lid".to_string(),
            category.name_property(),
            category.type_property(),
            category.description_property(),
        ];

        let mut entities = Vec::new();
        let mut token = None;
        loop {
            let page = self.execute_page(query.as_deref(), token.as_ref(), &fields)?;
            for record in &page.records {
                match Self::context_entity(category, record) {
                    Some(entity) => entities.push(entity),
                    None => debug!("Skipping context product {} without a name", record.id),
                }
            }
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(entities)
    }
}
