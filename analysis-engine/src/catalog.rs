use serde::Serialize;

use crate::error::AnalysisError;
use crate::statistics::{self, StatisticsResult};

pub const DEFAULT_DATASET: &str = "temperatures";

#[derive(Debug, Clone, Serialize)]
pub struct CatalogDatasetEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub values: &'static [f64],
}

/// The fixed set of demonstration samples. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct DatasetCatalog {
    datasets: Vec<CatalogDatasetEntry>,
}

const TEMPERATURES: &[f64] = &[72.0, 75.0, 68.0, 80.0, 77.0, 74.0, 69.0, 78.0, 76.0, 73.0];
const TEST_SCORES: &[f64] = &[88.0, 92.0, 79.0, 95.0, 87.0, 90.0, 84.0, 89.0, 93.0, 86.0];
const SALES_FIGURES: &[f64] = &[1200.0, 1450.0, 980.0, 1680.0, 1250.0, 1520.0, 1100.0, 1400.0];

impl DatasetCatalog {
    pub fn builtin() -> Self {
        Self {
            datasets: vec![
                CatalogDatasetEntry {
                    id: "temperatures",
                    label: "Temperatures (°F)",
                    values: TEMPERATURES,
                },
                CatalogDatasetEntry {
                    id: "testScores",
                    label: "Test Scores",
                    values: TEST_SCORES,
                },
                CatalogDatasetEntry {
                    id: "salesFigures",
                    label: "Sales Figures ($)",
                    values: SALES_FIGURES,
                },
            ],
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.datasets.iter().map(|d| d.id)
    }

    pub fn entries(&self) -> &[CatalogDatasetEntry] {
        &self.datasets
    }

    pub fn get(&self, dataset_id: &str) -> Result<&CatalogDatasetEntry, AnalysisError> {
        self.datasets
            .iter()
            .find(|d| d.id == dataset_id)
            .ok_or_else(|| AnalysisError::DatasetNotFound {
                dataset_id: dataset_id.to_string(),
            })
    }

    /// Human readable name, falling back to the key for unknown datasets.
    pub fn label<'a>(&self, dataset_id: &'a str) -> &'a str {
        match self.datasets.iter().find(|d| d.id == dataset_id) {
            Some(entry) => entry.label,
            None => dataset_id,
        }
    }

    /// Bracketed sample listing, e.g. `[72, 75, 68]`.
    pub fn preview(&self, dataset_id: &str) -> Result<String, AnalysisError> {
        let entry = self.get(dataset_id)?;
        let values: Vec<String> = entry.values.iter().map(|v| v.to_string()).collect();
        Ok(format!("[{}]", values.join(", ")))
    }

    pub fn analyze(&self, dataset_id: &str) -> Result<StatisticsResult, AnalysisError> {
        let entry = self.get(dataset_id)?;
        Ok(statistics::analyze(entry.values)?)
    }
}

impl Default for DatasetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_order_and_default() {
        let catalog = DatasetCatalog::builtin();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, vec!["temperatures", "testScores", "salesFigures"]);
        assert!(catalog.get(DEFAULT_DATASET).is_ok());
    }

    #[test]
    fn labels_fall_back_to_key() {
        let catalog = DatasetCatalog::builtin();
        assert_eq!(catalog.label("salesFigures"), "Sales Figures ($)");
        assert_eq!(catalog.label("rainfall"), "rainfall");
    }

    #[test]
    fn preview_prints_integers_without_fraction() {
        let catalog = DatasetCatalog::builtin();
        let preview = catalog.preview("salesFigures").unwrap();
        assert_eq!(preview, "[1200, 1450, 980, 1680, 1250, 1520, 1100, 1400]");
    }

    #[test]
    fn analyze_sales_figures() {
        let catalog = DatasetCatalog::builtin();
        let report = catalog.analyze("salesFigures").unwrap().report();
        assert_eq!(report.count, 8);
        assert_eq!(report.sum, "10580.00");
        assert_eq!(report.average, "1322.50");
        assert_eq!(report.median, "1325.00");
        assert_eq!(report.minimum, 980.0);
        assert_eq!(report.maximum, 1680.0);
        assert_eq!(report.range, "700.00");
    }

    #[test]
    fn unknown_dataset_is_not_found() {
        let catalog = DatasetCatalog::builtin();
        let err = catalog.analyze("rainfall").unwrap_err();
        assert!(matches!(err, AnalysisError::DatasetNotFound { ref dataset_id } if dataset_id == "rainfall"));
    }
}
