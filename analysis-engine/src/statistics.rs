//! Descriptive statistics over a fixed numeric sample.
//!
//! Raw input may contain entries that are not finite numbers; those are
//! dropped (order preserved) before any aggregate is computed. An empty input
//! and an input with nothing left after filtering are reported as distinct
//! errors rather than folded into a zero result.

use serde::Serialize;
use std::fmt;

use crate::error::StatisticsError;

/// Aggregates over the finite values of a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsResult {
    pub sum: f64,
    pub average: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub count: usize,
    pub median: f64,
    pub range: f64,
}

/// Display form of a [`StatisticsResult`].
///
/// `sum`, `average`, `median` and `range` carry exactly two fractional
/// digits. `minimum`, `maximum` and `count` are reported as given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub sum: String,
    pub average: String,
    pub minimum: f64,
    pub maximum: f64,
    pub count: usize,
    pub median: String,
    pub range: String,
}

/// Summarise a sequence of floats, skipping NaN and infinities.
pub fn analyze(values: &[f64]) -> Result<StatisticsResult, StatisticsError> {
    if values.is_empty() {
        return Err(StatisticsError::EmptyDataset);
    }

    let valid: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    summarize(valid)
}

/// Summarise a sequence of loosely typed cells.
///
/// Only JSON numbers count. Strings are skipped even when they look numeric.
pub fn analyze_raw(values: &[serde_json::Value]) -> Result<StatisticsResult, StatisticsError> {
    if values.is_empty() {
        return Err(StatisticsError::EmptyDataset);
    }

    let valid: Vec<f64> = values
        .iter()
        .filter_map(serde_json::Value::as_f64)
        .filter(|v| v.is_finite())
        .collect();
    summarize(valid)
}

fn summarize(valid: Vec<f64>) -> Result<StatisticsResult, StatisticsError> {
    if valid.is_empty() {
        return Err(StatisticsError::NoValidValues);
    }

    let count = valid.len();
    let n = count as f64;
    let sum: f64 = valid.iter().sum();
    let minimum = valid.iter().copied().fold(f64::INFINITY, f64::min);
    let maximum = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // The total can exceed f64 even when every sample is finite; scale first then.
    let average = if sum.is_finite() {
        sum / n
    } else {
        valid.iter().map(|v| v / n).sum()
    };
    let average = average.clamp(minimum, maximum);

    let mut sorted = valid;
    sorted.sort_by(f64::total_cmp);
    let mid = count / 2;
    let median = if count % 2 == 0 {
        let (lo, hi) = (sorted[mid - 1], sorted[mid]);
        (lo / 2.0 + hi / 2.0).clamp(lo, hi)
    } else {
        sorted[mid]
    };

    Ok(StatisticsResult {
        sum,
        average,
        minimum,
        maximum,
        count,
        median,
        range: maximum - minimum,
    })
}

impl StatisticsResult {
    pub fn report(&self) -> StatisticsReport {
        StatisticsReport {
            sum: format!("{:.2}", self.sum),
            average: format!("{:.2}", self.average),
            minimum: self.minimum,
            maximum: self.maximum,
            count: self.count,
            median: format!("{:.2}", self.median),
            range: format!("{:.2}", self.range),
        }
    }
}

impl fmt::Display for StatisticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sum:     {}", self.sum)?;
        writeln!(f, "Average: {}", self.average)?;
        writeln!(f, "Minimum: {}", self.minimum)?;
        writeln!(f, "Maximum: {}", self.maximum)?;
        writeln!(f, "Count:   {}", self.count)?;
        writeln!(f, "Median:  {}", self.median)?;
        write!(f, "Range:   {}", self.range)
    }
}
