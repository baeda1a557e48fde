use crate::query::ProductClass;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Multi-valued PDS4 properties keyed by dotted path, in backend order
pub type PropertyMap = IndexMap<String, Vec<Value>>;

/// One search result as returned by the registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// LIDVID of the product
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_properties")]
    pub properties: PropertyMap,
}

/// Scalars are wrapped in a one-element list, nulls become an empty list
fn deserialize_properties<'de, D>(deserializer: D) -> Result<PropertyMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IndexMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(path, value)| {
            let values = match value {
                Value::Array(values) => values,
                Value::Null => Vec::new(),
                other => vec![other],
            };
            (path, values)
        })
        .collect())
}

impl ProductRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    pub fn with_property<V: Into<Value>>(
        mut self,
        path: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.properties
            .insert(path.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn property(&self, path: &str) -> Option<&[Value]> {
        self.properties.get(path).map(Vec::as_slice)
    }

    /// First value of a property rendered as text
    pub fn first_text(&self, path: &str) -> Option<String> {
        self.property(path)?.first().and_then(value_text)
    }

    /// LID of the product: the `lid` property, else `id` without its version
    pub fn lid(&self) -> String {
        self.first_text("lid").unwrap_or_else(|| match self.id.split_once("::") {
            Some((lid, _)) => lid.to_string(),
            None => self.id.clone(),
        })
    }

    /// Derived product-type tag, from the record type or the `product_class` property
    pub fn type_tag(&self) -> Option<String> {
        self.record_type
            .clone()
            .or_else(|| self.first_text("product_class"))
    }

    pub fn product_class(&self) -> Option<ProductClass> {
        self.type_tag()
            .as_deref()
            .and_then(ProductClass::from_label)
    }

    /// Flat mapping with `id` and `type` first, then one entry per property.
    /// A property whose path is itself `id` or `type` goes under
    /// `properties.<path>` so it cannot shadow the record's own columns.
    pub fn flatten(&self) -> IndexMap<String, Value> {
        let mut flat = IndexMap::with_capacity(self.properties.len() + 2);
        flat.insert("id".to_string(), Value::String(self.id.clone()));
        flat.insert(
            "type".to_string(),
            self.type_tag().map(Value::String).unwrap_or(Value::Null),
        );
        for (path, values) in &self.properties {
            let column = match path.as_str() {
                "id" | "type" => format!("properties.{}", path),
                _ => path.clone(),
            };
            flat.insert(column, Value::Array(values.clone()));
        }
        flat
    }
}

pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
