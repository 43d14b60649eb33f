use crate::models::ResultRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Multi-select constraints; an empty set means "any"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub models: BTreeSet<String>,
    #[serde(default)]
    pub prompts: BTreeSet<String>,
    #[serde(default)]
    pub tests: BTreeSet<String>,
}

impl Selection {
    fn matches(&self, record: &ResultRecord) -> bool {
        allows(&self.models, &record.model_id)
            && allows(&self.prompts, &record.prompt_id)
            && allows(&self.tests, &record.test_id)
    }
}

fn allows(selected: &BTreeSet<String>, id: &str) -> bool {
    selected.is_empty() || selected.contains(id)
}

/// Filter applied to a result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// Model, prompt and test selections, ANDed
    Select(Selection),
    /// Case-insensitive substring over ids and output content
    Search(String),
}

impl Default for Filter {
    fn default() -> Self {
        Filter::Select(Selection::default())
    }
}

impl Filter {
    pub fn matches(&self, record: &ResultRecord) -> bool {
        match self {
            Filter::Select(selection) => selection.matches(record),
            Filter::Search(query) => matches_query(record, &query.to_lowercase()),
        }
    }
}

/// `needle` must already be lowercase
fn matches_query(record: &ResultRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let hit = |text: &str| text.to_lowercase().contains(needle);
    hit(&record.test_id)
        || hit(&record.model_id)
        || hit(&record.prompt_id)
        || record.output_content.as_deref().is_some_and(hit)
}

/// Records passing `filter`, in input order
pub fn apply<'a, I>(records: I, filter: &Filter) -> Vec<&'a ResultRecord>
where
    I: IntoIterator<Item = &'a ResultRecord>,
{
    records.into_iter().filter(|r| filter.matches(r)).collect()
}
