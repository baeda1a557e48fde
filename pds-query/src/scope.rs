use crate::expression::{FilterExpression, FilterValue, Operator};
use pds_context::EntityCategory;

pub const OREX_INVESTIGATION: &str = "urn:nasa:pds:context:investigation:mission.orex";

/// Property paths that give spatial filters their meaning for one mission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialProfile {
    /// Distance between spacecraft and target
    pub range_field: String,
    pub latitude_field: String,
    pub longitude_field: String,
}

/// A fixed, pre-applied filter that a builder carries for its whole life.
///
/// Scopes stack: a builder may hold any number of them, each adding its base
/// filter and its locks. The last scope with a spatial profile provides the
/// fields for `within_range` and `within_bbox`.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    name: String,
    base: FilterExpression,
    locked: Vec<EntityCategory>,
    spatial: Option<SpatialProfile>,
}

impl Scope {
    pub fn new(name: impl Into<String>, base: FilterExpression) -> Self {
        Self {
            name: name.into(),
            base,
            locked: Vec::new(),
            spatial: None,
        }
    }

    /// Scope fixing the investigation; `has_investigation` is refused afterwards
    pub fn investigation(name: impl Into<String>, lid: impl Into<String>) -> Self {
        Self::new(
            name,
            FilterExpression::predicate(
                "ref_lid_investigation",
                Operator::Eq,
                FilterValue::Identifier(lid.into()),
            ),
        )
        .locking(EntityCategory::Investigation)
    }

    /// OSIRIS-REx products, with the mission's spatial metadata
    pub fn orex() -> Self {
        Self::investigation("OSIRIS-REx", OREX_INVESTIGATION).with_spatial(SpatialProfile {
            range_field: "orex:Spatial.orex:target_range".to_string(),
            latitude_field: "orex:Spatial.orex:latitude".to_string(),
            longitude_field: "orex:Spatial.orex:longitude".to_string(),
        })
    }

    pub fn locking(mut self, category: EntityCategory) -> Self {
        if !self.locked.contains(&category) {
            self.locked.push(category);
        }
        self
    }

    pub fn with_spatial(mut self, profile: SpatialProfile) -> Self {
        self.spatial = Some(profile);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> &FilterExpression {
        &self.base
    }

    pub fn locks(&self, category: EntityCategory) -> bool {
        self.locked.contains(&category)
    }

    pub fn spatial(&self) -> Option<&SpatialProfile> {
        self.spatial.as_ref()
    }
}
