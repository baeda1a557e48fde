use crate::record::{value_text, ProductRecord};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::io::Write;
use tabular::{Row, Table};

/// In-memory table of products: one row per record, one column per property
/// path, after the leading `id` and `type` columns.
///
/// Multi-valued properties are kept as their full list. A record without a
/// given property holds `Value::Null` in that column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ProductFrame {
    /// Build from flat mappings; columns appear in first-seen order
    pub fn from_records(records: Vec<IndexMap<String, Value>>) -> Self {
        let columns: IndexSet<String> = records
            .iter()
            .flat_map(|record| record.keys().cloned())
            .collect();
        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|column| record.swap_remove(column).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self {
            columns: columns.into_iter().collect(),
            rows,
        }
    }

    /// `None` when there are no products, so "no results" is never a frame
    /// with missing columns
    pub fn from_products(products: &[ProductRecord]) -> Option<Self> {
        if products.is_empty() {
            return None;
        }
        Some(Self::from_records(
            products.iter().map(ProductRecord::flatten).collect(),
        ))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let position = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[position]).collect())
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Write as CSV with a header row; list cells are joined with `;`
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(cell_text))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, csv::Error> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Array(values) => values
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(";"),
        other => value_text(other).unwrap_or_default(),
    }
}

impl std::fmt::Display for ProductFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.columns.is_empty() {
            return Ok(());
        }
        let spec = vec!["{:<}"; self.columns.len()].join("  ");
        let mut table = Table::new(&spec);
        let mut header = Row::new();
        for column in &self.columns {
            header = header.with_cell(column);
        }
        table.add_row(header);
        for row in &self.rows {
            let mut line = Row::new();
            for value in row {
                line = line.with_cell(cell_text(value));
            }
            table.add_row(line);
        }
        write!(f, "{}", table)
    }
}
