use crate::aggregate::{aggregate, summarize};
use crate::comparison::resolve_comparison;
use crate::filter::apply;
use crate::matrix::{Coverage, Heatmap, build_matrix, distinct};
use crate::models::{
    EvaluationDetail, EvaluationSummary, Health, ModelStat, ResultRecord, SetSummary,
    evaluation_name,
};
use crate::source::ResultsSource;
use crate::status::{Status, classify};
use crate::view::{ViewMode, ViewState};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;

/// Loads evaluations from a source and turns them into views
pub struct Viewer {
    source: Box<dyn ResultsSource>,
    coverage_columns: usize,
}

/// All evaluations plus totals for the listing header
#[derive(Debug, Serialize)]
pub struct EvaluationList {
    pub evaluations: Vec<EvaluationSummary>,
    /// Results across every evaluation
    pub total_results: u64,
}

/// One evaluation rendered for a view state
#[derive(Debug, Serialize)]
pub struct EvaluationView<'a> {
    pub name: String,
    /// Statistics over every result, before filtering
    pub header: SetSummary,
    pub mode: ViewMode,
    /// Results left after filtering
    pub shown: usize,
    pub body: ViewBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum ViewBody<'a> {
    Overview {
        ranking: Vec<ModelStat>,
        coverage: Coverage,
    },
    Heatmap(Heatmap),
    Focused {
        /// Choices available for the comparison
        tests: Vec<&'a str>,
        models: Vec<&'a str>,
        test_id: String,
        selected_models: Vec<String>,
        results: Vec<Card<'a>>,
    },
    List {
        results: Vec<Card<'a>>,
    },
}

/// A single result as shown in the list and comparison views
#[derive(Debug, Serialize)]
pub struct Card<'a> {
    pub status: Status,
    pub expanded: bool,
    pub record: &'a ResultRecord,
}

impl Viewer {
    /// Create a viewer reading from `source`
    pub fn new(source: Box<dyn ResultsSource>, coverage_columns: usize) -> Self {
        Self {
            source,
            coverage_columns,
        }
    }

    /// Fetch the evaluation listing
    pub async fn list_evaluations(&self) -> Result<EvaluationList> {
        debug!("Fetching evaluation list");
        let evaluations = self
            .source
            .list()
            .await
            .context("Failed to load evaluations")?;

        let total_results = evaluations
            .iter()
            .map(|e| e.summary.total_results.unwrap_or(0))
            .sum();
        info!("Found {} evaluations", evaluations.len());

        Ok(EvaluationList {
            evaluations,
            total_results,
        })
    }

    /// Fetch one evaluation by filename
    pub async fn load_evaluation(&self, filename: &str) -> Result<EvaluationDetail> {
        debug!("Fetching evaluation {filename}");
        let detail = self
            .source
            .detail(filename)
            .await
            .with_context(|| format!("Failed to load evaluation {filename}"))?;

        info!(
            "Loaded {} results from {}",
            detail.results.len(),
            filename
        );
        Ok(detail)
    }

    /// Check that the results source is reachable
    pub async fn health(&self) -> Result<Health> {
        self.source
            .health()
            .await
            .context("Results source is not healthy")
    }

    /// Render `detail` as seen through `state`
    pub fn render<'a>(
        &self,
        filename: &str,
        detail: &'a EvaluationDetail,
        state: &ViewState,
    ) -> EvaluationView<'a> {
        let filtered = apply(&detail.results, &state.filter());
        debug!(
            "{} of {} results pass the {:?} filter",
            filtered.len(),
            detail.results.len(),
            state.mode
        );

        let body = match state.mode {
            ViewMode::Overview => self.overview(&filtered),
            ViewMode::Heatmap => ViewBody::Heatmap(build_matrix(&filtered).heatmap(state.metric)),
            ViewMode::Focused => self.focused(&filtered, state),
            ViewMode::List => ViewBody::List {
                results: cards(&filtered, state),
            },
        };

        EvaluationView {
            name: evaluation_name(filename),
            header: summarize(&detail.results),
            mode: state.mode,
            shown: filtered.len(),
            body,
        }
    }

    /// Ranking and coverage for the overview dashboard
    fn overview<'a>(&self, records: &[&'a ResultRecord]) -> ViewBody<'a> {
        ViewBody::Overview {
            ranking: aggregate(records),
            coverage: build_matrix(records).coverage(self.coverage_columns),
        }
    }

    /// Comparison of one test across the selected models
    fn focused<'a>(&self, records: &[&'a ResultRecord], state: &ViewState) -> ViewBody<'a> {
        let tests = distinct(records.iter().copied(), |r| r.test_id.as_str());
        let models = distinct(records.iter().copied(), |r| r.model_id.as_str());
        let compared = resolve_comparison(
            records.iter().copied(),
            &state.compare_test,
            &state.compare_models,
        );

        ViewBody::Focused {
            tests,
            models,
            test_id: state.compare_test.clone(),
            selected_models: state.compare_models.clone(),
            results: cards(&compared, state),
        }
    }
}

fn cards<'a>(records: &[&'a ResultRecord], state: &ViewState) -> Vec<Card<'a>> {
    records
        .iter()
        .map(|&record| Card {
            status: classify(record),
            expanded: state.is_expanded(&record.id),
            record,
        })
        .collect()
}
