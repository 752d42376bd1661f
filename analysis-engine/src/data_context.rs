//! Uploaded tabular data and the text context sent alongside chat prompts.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::statistics::{self, StatisticsResult};

/// Rows included verbatim in the prompt context.
const SAMPLE_ROWS: usize = 3;

pub type DataRow = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSummary {
    pub total_rows: usize,
    pub total_columns: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<DataRow>,
}

impl DataTable {
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        info!("Loading CSV data from {}", path.display());
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Parse CSV with a header row. Cells that read as finite numbers become
    /// JSON numbers, empty cells become `null`, everything else stays text.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, AnalysisError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.is_empty() {
            return Err(AnalysisError::InvalidCsv {
                message: "missing header row".to_string(),
            });
        }

        // Rows are keyed by header name, so a repeated name would drop a column.
        let mut seen = HashSet::new();
        if let Some(name) = columns.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(AnalysisError::InvalidCsv {
                message: format!("duplicate column name: {}", name),
            });
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row: DataRow = columns
                .iter()
                .zip(record.iter())
                .map(|(name, cell)| (name.clone(), parse_cell(cell)))
                .collect();
            rows.push(row);
        }

        debug!("Parsed {} rows across {} columns", rows.len(), columns.len());
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn summary(&self) -> DataSummary {
        DataSummary {
            total_rows: self.rows.len(),
            total_columns: self.columns.len(),
        }
    }

    /// Columns with at least one value where every non-null value is a number.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|name| {
                let mut present = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(name.as_str()))
                    .filter(|v| !v.is_null())
                    .peekable();
                present.peek().is_some() && present.all(Value::is_number)
            })
            .map(String::as_str)
            .collect()
    }

    pub fn column_values(&self, column: &str) -> Result<Vec<Value>, AnalysisError> {
        if !self.columns.iter().any(|c| c == column) {
            return Err(AnalysisError::ColumnNotFound {
                column: column.to_string(),
            });
        }

        Ok(self
            .rows
            .iter()
            .map(|row| row.get(column).cloned().unwrap_or(Value::Null))
            .collect())
    }

    pub fn column_statistics(&self, column: &str) -> Result<StatisticsResult, AnalysisError> {
        let values = self.column_values(column)?;
        Ok(statistics::analyze_raw(&values)?)
    }
}

fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::Number(i.into());
    }
    match cell.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::String(cell.to_string()),
    }
}

/// Snapshot of a table rendered for the model's system prompt.
#[derive(Debug, Clone)]
pub struct DataContext {
    pub summary: DataSummary,
    pub numeric_columns: Vec<String>,
    pub sample: Vec<DataRow>,
}

impl DataContext {
    pub fn from_table(table: &DataTable) -> Self {
        Self {
            summary: table.summary(),
            numeric_columns: table
                .numeric_columns()
                .into_iter()
                .map(str::to_string)
                .collect(),
            sample: table.rows().iter().take(SAMPLE_ROWS).cloned().collect(),
        }
    }

    pub fn to_prompt_text(&self) -> Result<String, AnalysisError> {
        let sample = serde_json::to_string_pretty(&self.sample)?;
        Ok(format!(
            "\nTotal Rows: {}\nTotal Columns: {}\nNumeric Columns: {}\nSample Data: {}\n",
            self.summary.total_rows,
            self.summary.total_columns,
            self.numeric_columns.join(", "),
            sample
        ))
    }
}
