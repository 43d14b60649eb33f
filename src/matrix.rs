use crate::models::ResultRecord;
use crate::normalize::{Metric, Rgb, color_for};
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};

/// Colour of a heatmap cell without a result
pub const ABSENT_COLOR: &str = "#D1D5DB";

/// Distinct keys in order of first occurrence
pub fn distinct<'a, I, F>(records: I, key: F) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a ResultRecord>,
    F: Fn(&'a ResultRecord) -> &'a str,
{
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    for record in records {
        let value = key(record);
        if seen.insert(value) {
            ordered.push(value);
        }
    }
    ordered
}

/// Model × test lookup over a result set
#[derive(Debug)]
pub struct Matrix<'a> {
    records: Vec<&'a ResultRecord>,
    models: Vec<&'a str>,
    tests: Vec<&'a str>,
    /// model -> test -> first record in input order
    cells: HashMap<&'a str, HashMap<&'a str, &'a ResultRecord>>,
}

/// Build the model × test matrix for `records`
pub fn build_matrix<R: Borrow<ResultRecord>>(records: &[R]) -> Matrix<'_> {
    let records: Vec<&ResultRecord> = records.iter().map(|r| r.borrow()).collect();
    let models = distinct(records.iter().copied(), |r| r.model_id.as_str());
    let tests = distinct(records.iter().copied(), |r| r.test_id.as_str());

    let mut cells: HashMap<&str, HashMap<&str, &ResultRecord>> = HashMap::new();
    for &record in &records {
        cells
            .entry(record.model_id.as_str())
            .or_default()
            .entry(record.test_id.as_str())
            .or_insert(record);
    }

    Matrix {
        records,
        models,
        tests,
        cells,
    }
}

impl<'a> Matrix<'a> {
    /// First record for the pair, if any
    pub fn record(&self, model_id: &str, test_id: &str) -> Option<&'a ResultRecord> {
        self.cells
            .get(model_id)
            .and_then(|tests| tests.get(test_id))
            .copied()
    }

    pub fn presence(&self, model_id: &str, test_id: &str) -> bool {
        self.record(model_id, test_id).is_some()
    }

    /// Raw metric value of the first matching record; `None` when absent
    pub fn value(&self, model_id: &str, test_id: &str, metric: Metric) -> Option<f64> {
        self.record(model_id, test_id).map(|r| metric.value(r))
    }

    /// Coverage grid limited to the first `max_models` models
    pub fn coverage(&self, max_models: usize) -> Coverage {
        let shown: Vec<&str> = self.models.iter().take(max_models).copied().collect();
        let rows = self
            .tests
            .iter()
            .map(|&test_id| CoverageRow {
                test_id: test_id.to_string(),
                present: shown.iter().map(|m| self.presence(m, test_id)).collect(),
            })
            .collect();

        Coverage {
            models: shown.iter().map(|m| m.to_string()).collect(),
            hidden_models: self.models.len().saturating_sub(shown.len()),
            rows,
        }
    }

    /// Heatmap of `metric`, normalized over every record in the set
    pub fn heatmap(&self, metric: Metric) -> Heatmap {
        let all_values: Vec<f64> = self.records.iter().map(|r| metric.value(r)).collect();

        let rows = self
            .tests
            .iter()
            .map(|&test_id| HeatmapRow {
                test_id: test_id.to_string(),
                cells: self
                    .models
                    .iter()
                    .map(|m| {
                        self.value(m, test_id, metric).map(|value| {
                            let color = color_for(value, &all_values, metric);
                            HeatCell {
                                value,
                                intensity: color.g,
                                color,
                            }
                        })
                    })
                    .collect(),
            })
            .collect();

        Heatmap {
            metric,
            models: self.models.iter().map(|m| m.to_string()).collect(),
            rows,
            absent_color: ABSENT_COLOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coverage {
    pub models: Vec<String>,
    /// Models left out of the grid
    pub hidden_models: usize,
    pub rows: Vec<CoverageRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageRow {
    pub test_id: String,
    pub present: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub metric: Metric,
    pub models: Vec<String>,
    pub rows: Vec<HeatmapRow>,
    pub absent_color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRow {
    pub test_id: String,
    /// One entry per model, `None` where the model has no result
    pub cells: Vec<Option<HeatCell>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    pub value: f64,
    pub intensity: u8,
    pub color: Rgb,
}
