use crate::matrix::distinct;
use crate::models::{ModelStat, ResultRecord, SetSummary};
use crate::status::{Status, classify};
use std::borrow::Borrow;
use std::collections::HashMap;

/// Running totals for one model
#[derive(Default)]
struct Totals {
    latency: f64,
    tokens: f64,
    successes: usize,
    count: usize,
}

impl Totals {
    fn add(&mut self, record: &ResultRecord) {
        self.latency += record.latency();
        self.tokens += record.tokens() as f64;
        if classify(record) == Status::Success {
            self.successes += 1;
        }
        self.count += 1;
    }

    fn into_stat(self, model_id: &str) -> ModelStat {
        ModelStat {
            model_id: model_id.to_string(),
            avg_latency: calculate_mean(self.latency, self.count),
            avg_tokens: calculate_mean(self.tokens, self.count),
            success_rate: calculate_mean(self.successes as f64, self.count) * 100.0,
            count: self.count,
        }
    }
}

/// Per-model statistics, ranked by success rate then latency
pub fn aggregate<R: Borrow<ResultRecord>>(records: &[R]) -> Vec<ModelStat> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, Totals> = HashMap::new();

    for record in records {
        let record = record.borrow();
        let model_id = record.model_id.as_str();
        totals
            .entry(model_id)
            .or_insert_with(|| {
                order.push(model_id);
                Totals::default()
            })
            .add(record);
    }

    let mut stats: Vec<ModelStat> = order
        .into_iter()
        .filter_map(|model_id| totals.remove(model_id).map(|t| t.into_stat(model_id)))
        .collect();
    rank(&mut stats);
    stats
}

/// Sort descending by success rate; lower average latency wins ties.
/// The sort is stable, so full ties keep first-appearance order.
pub fn rank(stats: &mut [ModelStat]) {
    stats.sort_by(|a, b| {
        b.success_rate
            .total_cmp(&a.success_rate)
            .then_with(|| a.avg_latency.total_cmp(&b.avg_latency))
    });
}

/// Whole-set statistics for the evaluation header
pub fn summarize<R: Borrow<ResultRecord>>(records: &[R]) -> SetSummary {
    let count = records.len();
    let latency: f64 = records.iter().map(|r| r.borrow().latency()).sum();
    let tokens: f64 = records.iter().map(|r| r.borrow().tokens() as f64).sum();

    SetSummary {
        total_results: count,
        avg_latency: calculate_mean(latency, count),
        avg_tokens: calculate_mean(tokens, count),
        count_models: distinct(records.iter().map(|r| r.borrow()), |r| r.model_id.as_str()).len(),
        count_prompts: distinct(records.iter().map(|r| r.borrow()), |r| r.prompt_id.as_str()).len(),
        count_tests: distinct(records.iter().map(|r| r.borrow()), |r| r.test_id.as_str()).len(),
    }
}

/// Mean of a sum over `count` items, zero for no items
fn calculate_mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}
