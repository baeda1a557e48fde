use crate::errors::ContextError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of reference object a context product describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Target,
    InstrumentHost,
    Instrument,
    Investigation,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 4] = [
        EntityCategory::Target,
        EntityCategory::InstrumentHost,
        EntityCategory::Instrument,
        EntityCategory::Investigation,
    ];

    /// Segment used in context LIDs, e.g. `urn:nasa:pds:context:instrument_host:spacecraft.msl`
    pub fn lid_segment(&self) -> &'static str {
        match self {
            EntityCategory::Target => "target",
            EntityCategory::InstrumentHost => "instrument_host",
            EntityCategory::Instrument => "instrument",
            EntityCategory::Investigation => "investigation",
        }
    }

    /// PDS4 label class carrying the entity's descriptive attributes
    pub fn label_class(&self) -> &'static str {
        match self {
            EntityCategory::Target => "Target",
            EntityCategory::InstrumentHost => "Instrument_Host",
            EntityCategory::Instrument => "Instrument",
            EntityCategory::Investigation => "Investigation",
        }
    }

    pub fn name_property(&self) -> String {
        format!("pds:{}.pds:name", self.label_class())
    }

    pub fn type_property(&self) -> String {
        format!("pds:{}.pds:type", self.label_class())
    }

    pub fn description_property(&self) -> String {
        format!("pds:{}.pds:description", self.label_class())
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityCategory::Target => write!(f, "target"),
            EntityCategory::InstrumentHost => write!(f, "instrument host"),
            EntityCategory::Instrument => write!(f, "instrument"),
            EntityCategory::Investigation => write!(f, "investigation"),
        }
    }
}

impl FromStr for EntityCategory {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "target" | "targets" => Ok(EntityCategory::Target),
            "instrument_host" | "instrument_hosts" | "host" => Ok(EntityCategory::InstrumentHost),
            "instrument" | "instruments" => Ok(EntityCategory::Instrument),
            "investigation" | "investigations" | "mission" => Ok(EntityCategory::Investigation),
            _ => Err(ContextError::UnknownCategory(s.to_string())),
        }
    }
}

/// A named reference object of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntity {
    /// Canonical LID, e.g. `urn:nasa:pds:context:target:planet.mars`
    pub identifier: String,
    pub name: String,
    pub category: EntityCategory,
    /// Category-specific type tag, e.g. "Planet" or "Spacecraft"
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CatalogEntity {
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        category: EntityCategory,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            category,
            kind: None,
            description: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Upper-case code derived from the name: "The Mars Science Laboratory Curiosity Rover"
    /// becomes `THE_MARS_SCIENCE_LABORATORY_CURIOSITY_ROVER`.
    pub fn code(&self) -> String {
        self.name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_uppercase()
    }

    /// Last `:`-separated segment of the identifier, e.g. `planet.mars`
    pub fn identifier_tail(&self) -> &str {
        self.identifier
            .rsplit(':')
            .next()
            .unwrap_or(self.identifier.as_str())
    }
}
