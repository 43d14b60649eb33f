use crate::models::ResultRecord;

/// Results of one test, optionally limited to some models, fastest first.
///
/// An empty `test_id` selects nothing; an empty `model_ids` allows every model.
/// Equal latencies keep their input order.
pub fn resolve_comparison<'a, I>(
    records: I,
    test_id: &str,
    model_ids: &[String],
) -> Vec<&'a ResultRecord>
where
    I: IntoIterator<Item = &'a ResultRecord>,
{
    if test_id.is_empty() {
        return Vec::new();
    }

    let mut selected: Vec<&ResultRecord> = records
        .into_iter()
        .filter(|r| r.test_id == test_id)
        .filter(|r| model_ids.is_empty() || model_ids.iter().any(|m| *m == r.model_id))
        .collect();

    selected.sort_by(|a, b| a.latency().total_cmp(&b.latency()));
    selected
}
