use crate::errors::QueryError;
use crate::expression::FilterExpression;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Mutually exclusive product-type restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductClass {
    Observational,
    Collection,
    Bundle,
    Context,
}

impl ProductClass {
    /// Value of the `product_class` property, e.g. `Product_Observational`
    pub fn label(&self) -> &'static str {
        match self {
            ProductClass::Observational => "Product_Observational",
            ProductClass::Collection => "Product_Collection",
            ProductClass::Bundle => "Product_Bundle",
            ProductClass::Context => "Product_Context",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Product_Observational" => Some(ProductClass::Observational),
            "Product_Collection" => Some(ProductClass::Collection),
            "Product_Bundle" => Some(ProductClass::Bundle),
            "Product_Context" => Some(ProductClass::Context),
            _ => None,
        }
    }

    pub fn clause(&self) -> String {
        format!("product_class eq \"{}\"", self.label())
    }
}

impl std::fmt::Display for ProductClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductClass::Observational => write!(f, "observational"),
            ProductClass::Collection => write!(f, "collection"),
            ProductClass::Bundle => write!(f, "bundle"),
            ProductClass::Context => write!(f, "context"),
        }
    }
}

/// How much transformation has been applied to the instrument data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingLevel {
    Telemetry,
    Raw,
    PartiallyProcessed,
    Calibrated,
    Derived,
}

impl ProcessingLevel {
    pub const ALL: [ProcessingLevel; 5] = [
        ProcessingLevel::Telemetry,
        ProcessingLevel::Raw,
        ProcessingLevel::PartiallyProcessed,
        ProcessingLevel::Calibrated,
        ProcessingLevel::Derived,
    ];

    /// Value of `pds:Primary_Result_Summary.pds:processing_level`
    pub fn label(&self) -> &'static str {
        match self {
            ProcessingLevel::Telemetry => "Telemetry",
            ProcessingLevel::Raw => "Raw",
            ProcessingLevel::PartiallyProcessed => "Partially Processed",
            ProcessingLevel::Calibrated => "Calibrated",
            ProcessingLevel::Derived => "Derived",
        }
    }
}

impl std::fmt::Display for ProcessingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ProcessingLevel {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "telemetry" => Ok(ProcessingLevel::Telemetry),
            "raw" => Ok(ProcessingLevel::Raw),
            "partially-processed" => Ok(ProcessingLevel::PartiallyProcessed),
            "calibrated" => Ok(ProcessingLevel::Calibrated),
            "derived" => Ok(ProcessingLevel::Derived),
            _ => Err(QueryError::InvalidArgument {
                argument: "processing_level",
                reason: format!(
                    "'{}' is not one of telemetry, raw, partially-processed, calibrated, derived",
                    s
                ),
            }),
        }
    }
}

/// Accumulated intent of a builder, independent of any transport
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    pub filter: FilterExpression,
    pub product_class: Option<ProductClass>,
    /// Requested property paths; empty means the full record
    pub fields: Vec<String>,
    /// Result-size cap
    pub limit: Option<usize>,
}

impl QuerySpec {
    /// Compile to the backend query string, `None` meaning "match all".
    ///
    /// Every conjunct is parenthesized and joined with ` and ` in insertion
    /// order; the product-type restriction comes last.
    pub fn compile(&self) -> Option<String> {
        let mut clauses: Vec<String> = self
            .filter
            .children()
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| format!("({})", c))
            .collect();
        if let Some(class) = self.product_class {
            clauses.push(format!("({})", class.clause()));
        }
        if clauses.is_empty() {
            None
        } else {
            Some(clauses.join(" and "))
        }
    }

    pub fn is_match_all(&self) -> bool {
        self.filter.is_empty() && self.product_class.is_none()
    }

    /// Effective cap once an additional bound is applied
    pub(crate) fn capped(&self, max_rows: Option<usize>) -> Option<usize> {
        match (self.limit, max_rows) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
