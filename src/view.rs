use crate::filter::{Filter, Selection};
use crate::normalize::Metric;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which rendering of an evaluation is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Performance ranking and test coverage
    #[default]
    Overview,
    /// Model × test grid coloured by a metric
    Heatmap,
    /// Side-by-side results of one test
    Focused,
    /// Every result, filtered by model/prompt/test
    List,
}

/// Snapshot of everything the user has selected while viewing an evaluation.
///
/// Owned by the caller and passed into the view functions on every query;
/// updates return a new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub mode: ViewMode,
    pub selection: Selection,
    pub search: String,
    pub metric: Metric,
    pub compare_test: String,
    pub compare_models: Vec<String>,
    pub expanded: BTreeSet<String>,
}

impl ViewState {
    pub fn new(mode: ViewMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// The list view filters by selection, every other view by search text
    pub fn filter(&self) -> Filter {
        match self.mode {
            ViewMode::List => Filter::Select(self.selection.clone()),
            _ => Filter::Search(self.search.clone()),
        }
    }

    pub fn is_expanded(&self, result_id: &str) -> bool {
        self.expanded.contains(result_id)
    }

    /// Flip the expanded state of one result card
    pub fn toggle_expanded(&self, result_id: &str) -> Self {
        let mut next = self.clone();
        if !next.expanded.remove(result_id) {
            next.expanded.insert(result_id.to_string());
        }
        next
    }

    /// Add or remove a model from the comparison, keeping selection order
    pub fn toggle_compare_model(&self, model_id: &str) -> Self {
        let mut next = self.clone();
        match next.compare_models.iter().position(|m| m == model_id) {
            Some(index) => {
                next.compare_models.remove(index);
            }
            None => next.compare_models.push(model_id.to_string()),
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_follows_mode() {
        let mut state = ViewState::new(ViewMode::List);
        state.search = "gpt".to_string();
        state.selection.models.insert("claude-3".to_string());
        assert_eq!(state.filter(), Filter::Select(state.selection.clone()));

        state.mode = ViewMode::Heatmap;
        assert_eq!(state.filter(), Filter::Search("gpt".to_string()));
    }

    #[test]
    fn test_toggle_expanded() {
        let state = ViewState::default();
        let opened = state.toggle_expanded("r1");
        assert!(opened.is_expanded("r1"));
        assert!(!state.is_expanded("r1"));

        let closed = opened.toggle_expanded("r1");
        assert!(!closed.is_expanded("r1"));
    }

    #[test]
    fn test_toggle_compare_model() {
        let state = ViewState::new(ViewMode::Focused)
            .toggle_compare_model("b")
            .toggle_compare_model("a");
        assert_eq!(state.compare_models, vec!["b", "a"]);

        let state = state.toggle_compare_model("b");
        assert_eq!(state.compare_models, vec!["a"]);
    }
}
