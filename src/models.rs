use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Function invoked by a tool call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default)]
    pub name: String,
    /// Raw JSON-encoded arguments, as emitted by the model
    #[serde(default)]
    pub arguments: String,
}

/// Tool call attached to a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub function: FunctionCall,
}

/// One chat message sent to or produced by a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// One model's response to one prompt within one test case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Unique identifier within a result set
    pub id: String,
    pub model_id: String,
    pub prompt_id: String,
    pub test_id: String,
    /// Response latency in milliseconds
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    /// Supplied by the producer, never recomputed from the other counts
    #[serde(default)]
    pub total_tokens: Option<u64>,
    #[serde(default)]
    pub output_content: Option<String>,
    #[serde(default)]
    pub input_messages: Vec<Message>,
    #[serde(default)]
    pub output_messages: Vec<Message>,
    #[serde(default)]
    pub created_at: String,
}

impl ResultRecord {
    /// Latency with missing values counted as zero
    pub fn latency(&self) -> f64 {
        self.latency_ms.unwrap_or(0.0)
    }

    /// Total tokens with missing values counted as zero
    pub fn tokens(&self) -> u64 {
        self.total_tokens.unwrap_or(0)
    }
}

/// Summary block stored at the top of every result file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_latency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_models: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_prompts: Option<u64>,
    /// Evaluation-specific keys not covered above
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Listing entry for one evaluation file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub filename: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub summary: Summary,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub file_size: u64,
}

impl EvaluationSummary {
    /// Human readable name derived from the filename
    pub fn name(&self) -> String {
        evaluation_name(&self.filename)
    }

    /// Identifier used to fetch the evaluation detail
    pub fn id(&self) -> &str {
        evaluation_id(&self.filename)
    }
}

/// Response body of the results listing endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsList {
    #[serde(default)]
    pub results: Vec<EvaluationSummary>,
}

/// Full content of one evaluation file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDetail {
    #[serde(default)]
    pub summary: Summary,
    #[serde(default)]
    pub results: Vec<ResultRecord>,
}

/// Response body of the health endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub service: String,
}

/// Per-model statistics for the performance ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStat {
    pub model_id: String,
    pub avg_latency: f64,
    pub avg_tokens: f64,
    /// Percentage of successful results (0 to 100)
    pub success_rate: f64,
    pub count: usize,
}

/// Statistics over a whole result set, shown in the evaluation header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetSummary {
    pub total_results: usize,
    pub avg_latency: f64,
    pub avg_tokens: f64,
    pub count_models: usize,
    pub count_prompts: usize,
    pub count_tests: usize,
}

/// Short form of an identifier: the part after the last `-`
pub fn short_id(id: &str) -> &str {
    match id.rsplit_once('-') {
        Some((_, tail)) => tail,
        None => id,
    }
}

/// Filename without its `.json` suffix
pub fn evaluation_id(filename: &str) -> &str {
    filename.strip_suffix(".json").unwrap_or(filename)
}

/// Display name: `.json` dropped, underscores turned into spaces
pub fn evaluation_name(filename: &str) -> String {
    evaluation_id(filename).replace('_', " ")
}
