use crate::client::RegistryClient;
use crate::cursor::ResultCursor;
use crate::errors::QueryError;
use crate::expression::{FilterExpression, FilterValue, Operator};
use crate::frame::ProductFrame;
use crate::query::{ProcessingLevel, ProductClass, QuerySpec};
use crate::record::ProductRecord;
use crate::scope::{Scope, SpatialProfile};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use pds_context::EntityCategory;

pub const START_TIME_FIELD: &str = "pds:Time_Coordinates.pds:start_date_time";
pub const COLLECTION_FIELD: &str = "ops:Provenance.ops:parent_collection_identifier";
pub const PROCESSING_LEVEL_FIELD: &str = "pds:Primary_Result_Summary.pds:processing_level";

/// Reference field linking a product to a context entity
pub fn reference_field(category: EntityCategory) -> &'static str {
    match category {
        EntityCategory::Target => "ref_lid_target",
        EntityCategory::InstrumentHost => "ref_lid_instrument_host",
        EntityCategory::Instrument => "ref_lid_instrument",
        EntityCategory::Investigation => "ref_lid_investigation",
    }
}

/// `urn:` followed by at least two more `:`-separated segments
pub fn looks_like_identifier(s: &str) -> bool {
    let mut segments = s.trim().split(':');
    segments.next() == Some("urn") && segments.filter(|seg| !seg.is_empty()).count() >= 2
}

/// Non-fatal signal recorded while building
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderWarning {
    ProductClassReplaced {
        previous: ProductClass,
        current: ProductClass,
    },
}

impl std::fmt::Display for BuilderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuilderWarning::ProductClassReplaced { previous, current } => write!(
                f,
                "Product type restriction changed from {} to {}; a product has only one type",
                previous, current
            ),
        }
    }
}

/// Fluent accumulator of search criteria.
///
/// Nothing is sent to the registry until the builder is iterated, converted
/// with [`QueryBuilder::as_dataframe`] or asked for a product with
/// [`QueryBuilder::get`], except for the context listings needed to resolve
/// names. Each filter method consumes the builder and returns the new state;
/// clone a builder to keep an intermediate state around. Execution borrows
/// the builder, so it can spawn any number of independent cursors.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    client: RegistryClient,
    spec: QuerySpec,
    scopes: Vec<Scope>,
    warnings: Vec<BuilderWarning>,
}

impl QueryBuilder {
    pub fn new(client: RegistryClient) -> Self {
        Self {
            client,
            spec: QuerySpec::default(),
            scopes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Append a typed predicate; the backend is the judge of its validity
    pub fn restrict_by_field(
        self,
        path: impl Into<String>,
        operator: Operator,
        value: impl Into<FilterValue>,
    ) -> Self {
        self.restrict(FilterExpression::predicate(path, operator, value))
    }

    pub fn restrict(mut self, expression: FilterExpression) -> Self {
        self.spec.filter = std::mem::take(&mut self.spec.filter).and(expression);
        self
    }

    /// Append a pre-formed clause of the backend query language, verbatim
    pub fn filter(self, clause: impl Into<String>) -> Self {
        self.restrict(FilterExpression::raw(clause))
    }

    pub fn has_target(self, name_or_id: &str) -> Result<Self, QueryError> {
        self.has_reference(EntityCategory::Target, name_or_id, "has_target")
    }

    pub fn has_instrument_host(self, name_or_id: &str) -> Result<Self, QueryError> {
        self.has_reference(EntityCategory::InstrumentHost, name_or_id, "has_instrument_host")
    }

    pub fn has_instrument(self, name_or_id: &str) -> Result<Self, QueryError> {
        self.has_reference(EntityCategory::Instrument, name_or_id, "has_instrument")
    }

    pub fn has_investigation(self, name_or_id: &str) -> Result<Self, QueryError> {
        self.has_reference(EntityCategory::Investigation, name_or_id, "has_investigation")
    }

    /// Products belonging to the collection with this LID
    pub fn of_collection(self, collection_lid: &str) -> Self {
        self.restrict_by_field(
            COLLECTION_FIELD,
            Operator::Eq,
            FilterValue::Identifier(collection_lid.trim().to_string()),
        )
    }

    pub fn has_processing_level(self, level: ProcessingLevel) -> Self {
        self.restrict_by_field(PROCESSING_LEVEL_FIELD, Operator::Eq, level.label())
    }

    /// Products whose start time is strictly before `time`; repeated calls
    /// keep the earliest bound
    pub fn before(self, time: DateTime<Utc>) -> Self {
        self.narrow_start_time(Operator::Lt, time)
    }

    /// Products whose start time is strictly after `time`; repeated calls
    /// keep the latest bound
    pub fn after(self, time: DateTime<Utc>) -> Self {
        self.narrow_start_time(Operator::Gt, time)
    }

    /// Observations taken within `distance` of the target, in the units of
    /// the scope's range field
    pub fn within_range(self, distance: f64) -> Result<Self, QueryError> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(QueryError::InvalidArgument {
                argument: "distance",
                reason: format!("expected a finite, non-negative number, got {}", distance),
            });
        }
        let profile = self.spatial_profile("within_range")?;
        let field = profile.range_field.clone();
        Ok(self.restrict_by_field(field, Operator::Le, distance))
    }

    pub fn within_bbox(
        self,
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    ) -> Result<Self, QueryError> {
        check_bounds("latitude", min_lat, max_lat)?;
        check_bounds("longitude", min_lon, max_lon)?;
        let profile = self.spatial_profile("within_bbox")?;
        let bbox = FilterExpression::all(vec![
            FilterExpression::predicate(profile.latitude_field.clone(), Operator::Ge, min_lat),
            FilterExpression::predicate(profile.latitude_field.clone(), Operator::Le, max_lat),
            FilterExpression::predicate(profile.longitude_field.clone(), Operator::Ge, min_lon),
            FilterExpression::predicate(profile.longitude_field.clone(), Operator::Le, max_lon),
        ]);
        Ok(self.restrict(bbox))
    }

    /// Replace the projection; paths are trimmed, duplicates dropped, order kept
    pub fn fields<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: Vec<String> = Vec::new();
        for path in paths {
            let path = path.into().trim().to_string();
            if !path.is_empty() && !fields.contains(&path) {
                fields.push(path);
            }
        }
        self.spec.fields = fields;
        self
    }

    pub fn observationals(self) -> Self {
        self.with_product_class(ProductClass::Observational)
    }

    pub fn collections(self) -> Self {
        self.with_product_class(ProductClass::Collection)
    }

    pub fn bundles(self) -> Self {
        self.with_product_class(ProductClass::Bundle)
    }

    pub fn contexts(self) -> Self {
        self.with_product_class(ProductClass::Context)
    }

    /// Set the product-type restriction; replacing a different one is
    /// allowed but recorded as a warning
    pub fn with_product_class(mut self, class: ProductClass) -> Self {
        if let Some(previous) = self.spec.product_class {
            if previous != class {
                let warning = BuilderWarning::ProductClassReplaced {
                    previous,
                    current: class,
                };
                warn!("{}", warning);
                self.warnings.push(warning);
            }
        }
        self.spec.product_class = Some(class);
        self
    }

    /// Stop after `n` records
    pub fn limit(mut self, n: usize) -> Self {
        self.spec.limit = Some(n);
        self
    }

    /// Layer a scope on top of the current state
    pub fn scoped(self, scope: Scope) -> Self {
        let base = scope.base().clone();
        let mut builder = self.restrict(base);
        builder.scopes.push(scope);
        builder
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub fn compile(&self) -> Option<String> {
        self.spec.compile()
    }

    pub fn warnings(&self) -> &[BuilderWarning] {
        &self.warnings
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// A fresh cursor over the current state
    pub fn cursor(&self) -> ResultCursor {
        ResultCursor::new(self.client.transport(), self.spec.clone())
    }

    /// Materialize the results, at most `max_rows` of them.
    ///
    /// Returns `Ok(None)` when nothing matched; a failed page request is an
    /// error, never an empty frame.
    pub fn as_dataframe(&self, max_rows: Option<usize>) -> Result<Option<ProductFrame>, QueryError> {
        self.cursor().with_max_rows(max_rows).into_frame()
    }

    /// First product with this LIDVID (when it carries `::version`) or LID
    pub fn get(&self, identifier: &str) -> Result<Option<ProductRecord>, QueryError> {
        let identifier = identifier.trim();
        let field = if identifier.contains("::") { "lidvid" } else { "lid" };
        let lookup = self
            .clone()
            .restrict_by_field(field, Operator::Eq, FilterValue::Identifier(identifier.to_string()))
            .limit(1);
        lookup.cursor().next().transpose()
    }

    fn has_reference(
        self,
        category: EntityCategory,
        name_or_id: &str,
        operation: &'static str,
    ) -> Result<Self, QueryError> {
        if let Some(scope) = self.scopes.iter().find(|s| s.locks(category)) {
            return Err(QueryError::ScopeConflict {
                scope: scope.name().to_string(),
                operation,
            });
        }
        let identifier = self.resolve(category, name_or_id)?;
        Ok(self.restrict_by_field(
            reference_field(category),
            Operator::Eq,
            FilterValue::Identifier(identifier),
        ))
    }

    fn resolve(&self, category: EntityCategory, name_or_id: &str) -> Result<String, QueryError> {
        let name = name_or_id.trim();
        if looks_like_identifier(name) {
            return Ok(name.to_string());
        }
        let index = self.client.context_index(category)?;
        let best = index
            .best_match(name)
            .ok_or_else(|| QueryError::AmbiguousOrUnknownName {
                category,
                name: name_or_id.to_string(),
            })?;
        debug!(
            "Resolved {} '{}' to {} ({}, score {:.3})",
            category, name, best.entity.identifier, best.entity.name, best.score
        );
        Ok(best.entity.identifier.clone())
    }

    fn narrow_start_time(mut self, operator: Operator, time: DateTime<Utc>) -> Self {
        let mut children = std::mem::take(&mut self.spec.filter).into_children();
        // Only a bound whose operand reads as a timestamp can be compared;
        // any other start-time clause stays and the new bound is added next to it
        let existing = children.iter().enumerate().find_map(|(position, child)| match child {
            FilterExpression::Predicate(p)
                if p.field == START_TIME_FIELD
                    && p.operator == operator
                    && p.values.len() == 1 =>
            {
                p.values[0].as_timestamp().map(|current| (position, current))
            }
            _ => None,
        });
        match existing {
            Some((position, current)) => {
                let bound = match operator {
                    Operator::Lt => current.min(time),
                    _ => current.max(time),
                };
                children[position] = FilterExpression::predicate(START_TIME_FIELD, operator, bound);
            }
            None => children.push(FilterExpression::predicate(START_TIME_FIELD, operator, time)),
        }
        self.spec.filter = FilterExpression::all(children);
        self
    }

    fn spatial_profile(&self, operation: &'static str) -> Result<&SpatialProfile, QueryError> {
        self.scopes
            .iter()
            .rev()
            .find_map(Scope::spatial)
            .ok_or_else(|| QueryError::UnsupportedFilter {
                operation,
                reason: "no scope of this builder defines spatial fields".to_string(),
            })
    }
}

fn check_bounds(argument: &'static str, min: f64, max: f64) -> Result<(), QueryError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(QueryError::InvalidArgument {
            argument,
            reason: format!("bounds must be finite numbers, got {} and {}", min, max),
        });
    }
    if min > max {
        return Err(QueryError::InvalidArgument {
            argument,
            reason: format!("min {} is greater than max {}", min, max),
        });
    }
    Ok(())
}

impl IntoIterator for &QueryBuilder {
    type Item = Result<ProductRecord, QueryError>;
    type IntoIter = ResultCursor;

    fn into_iter(self) -> Self::IntoIter {
        self.cursor()
    }
}

impl IntoIterator for QueryBuilder {
    type Item = Result<ProductRecord, QueryError>;
    type IntoIter = ResultCursor;

    fn into_iter(self) -> Self::IntoIter {
        ResultCursor::new(self.client.transport(), self.spec)
    }
}
