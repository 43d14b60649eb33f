use crate::matrix::{Coverage, Heatmap};
use crate::models::{Health, Message, ModelStat, SetSummary, short_id};
use crate::normalize::Metric;
use crate::viewer::{Card, EvaluationList, EvaluationView, ViewBody};
use clap::ValueEnum;
use log::error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

/// Print the evaluation listing in the specified format
pub fn print_list(list: &EvaluationList, format: OutputFormat) {
    match format {
        OutputFormat::Plain => print!("{}", PlainList(list)),
        OutputFormat::Json => print_json(list),
    }
}

/// Print one evaluation view in the specified format
pub fn print_view(view: &EvaluationView<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Plain => print!("{}", PlainView(view)),
        OutputFormat::Json => print_json(view),
    }
}

pub fn print_health(health: &Health, format: OutputFormat) {
    match format {
        OutputFormat::Plain => println!("{}: {}", health.service, health.status),
        OutputFormat::Json => print_json(health),
    }
}

/// Print any serializable value as pretty JSON
fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Error serializing results to JSON: {}", e),
    }
}

/// Plain text rendering of the evaluation listing
pub struct PlainList<'a>(pub &'a EvaluationList);

impl fmt::Display for PlainList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = self.0;
        writeln!(
            f,
            "📚 {} evaluations, {} results",
            list.evaluations.len(),
            list.total_results
        )?;
        writeln!(f, "{}", "-".repeat(40))?;

        if list.evaluations.is_empty() {
            return writeln!(f, "No evaluations found.");
        }

        for evaluation in &list.evaluations {
            let summary = &evaluation.summary;
            writeln!(f, "{}  ({})", evaluation.name(), evaluation.id())?;
            writeln!(
                f,
                "  Models: {} | Prompts: {} | Results: {}",
                count(summary.count_models),
                count(summary.count_prompts),
                summary.total_results.unwrap_or(0)
            )?;
            writeln!(
                f,
                "  Avg latency: {:.0}ms | Created: {} | Size: {} bytes",
                summary.avg_latency.unwrap_or(0.0),
                or_dash(&evaluation.created_at),
                evaluation.file_size
            )?;
        }
        Ok(())
    }
}

fn count(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() { "-" } else { text }
}

/// Plain text rendering of one evaluation view
pub struct PlainView<'a, 'b>(pub &'a EvaluationView<'b>);

impl fmt::Display for PlainView<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        writeln!(f, "=== {} ===", view.name)?;
        write_header(f, &view.header)?;
        writeln!(
            f,
            "Showing {} of {} results",
            view.shown, view.header.total_results
        )?;
        writeln!(f)?;

        match &view.body {
            ViewBody::Overview { ranking, coverage } => {
                write_ranking(f, ranking)?;
                writeln!(f)?;
                write_coverage(f, coverage)
            }
            ViewBody::Heatmap(heatmap) => write_heatmap(f, heatmap),
            ViewBody::Focused {
                tests,
                models,
                test_id,
                selected_models,
                results,
            } => {
                writeln!(f, "🔍 FOCUSED COMPARISON")?;
                writeln!(f, "---------------------")?;
                writeln!(f, "Tests: {}", tests.join(", "))?;
                writeln!(f, "Models: {}", models.join(", "))?;
                if test_id.is_empty() {
                    return writeln!(f, "Select a test to compare (--compare-test).");
                }
                let compared = if selected_models.is_empty() {
                    "all models".to_string()
                } else {
                    selected_models.join(", ")
                };
                writeln!(f, "Comparing {} across {}", test_id, compared)?;
                if results.is_empty() {
                    return writeln!(f, "No results found for the selected test and model filters.");
                }
                let plural = if results.len() == 1 { "" } else { "s" };
                writeln!(f, "{} result{} (fastest first)", results.len(), plural)?;
                writeln!(f)?;
                write_cards(f, results)
            }
            ViewBody::List { results } => {
                writeln!(f, "📝 RESULTS")?;
                writeln!(f, "----------")?;
                if results.is_empty() {
                    return writeln!(f, "No results match the current filters.");
                }
                write_cards(f, results)
            }
        }
    }
}

fn write_header(f: &mut fmt::Formatter<'_>, header: &SetSummary) -> fmt::Result {
    writeln!(
        f,
        "{} models • {} prompts • {} tests • {} results",
        header.count_models, header.count_prompts, header.count_tests, header.total_results
    )?;
    writeln!(
        f,
        "Avg latency: {:.0}ms | Avg tokens: {:.0}",
        header.avg_latency, header.avg_tokens
    )
}

fn write_ranking(f: &mut fmt::Formatter<'_>, ranking: &[ModelStat]) -> fmt::Result {
    writeln!(f, "🏆 MODEL PERFORMANCE RANKING")?;
    writeln!(f, "----------------------------")?;
    if ranking.is_empty() {
        return writeln!(f, "No results available.");
    }

    let width = column_width(ranking.iter().map(|s| s.model_id.as_str()), "Model");
    writeln!(
        f,
        "{:<4} {:<width$} {:>8} {:>10} {:>8} {:>6}",
        "Rank", "Model", "Success", "Latency", "Tokens", "Tests"
    )?;
    for (index, stat) in ranking.iter().enumerate() {
        writeln!(
            f,
            "{:<4} {:<width$} {:>7.0}% {:>8.0}ms {:>8.0} {:>6}",
            format!("#{}", index + 1),
            stat.model_id,
            stat.success_rate,
            stat.avg_latency,
            stat.avg_tokens,
            stat.count
        )?;
    }
    Ok(())
}

fn write_coverage(f: &mut fmt::Formatter<'_>, coverage: &Coverage) -> fmt::Result {
    writeln!(f, "🧪 TEST COVERAGE")?;
    writeln!(f, "----------------")?;
    if coverage.rows.is_empty() {
        return writeln!(f, "No tests available.");
    }

    let width = column_width(coverage.rows.iter().map(|r| r.test_id.as_str()), "Test");
    let columns: Vec<&str> = coverage.models.iter().map(|m| short_id(m)).collect();
    let cell = column_width(columns.iter().copied(), "").max(3);

    write!(f, "{:<width$}", "Test")?;
    for column in &columns {
        write!(f, " {:^cell$}", column)?;
    }
    if coverage.hidden_models > 0 {
        write!(f, " +{} more", coverage.hidden_models)?;
    }
    writeln!(f)?;

    for row in &coverage.rows {
        write!(f, "{:<width$}", row.test_id)?;
        for &present in &row.present {
            write!(f, " {:^cell$}", if present { "✓" } else { "✗" })?;
        }
        writeln!(f)?;
    }
    Ok(())
}

fn write_heatmap(f: &mut fmt::Formatter<'_>, heatmap: &Heatmap) -> fmt::Result {
    let better = if heatmap.metric.higher_is_better() {
        "higher is better"
    } else {
        "lower is better"
    };
    writeln!(f, "🌡  HEATMAP: {} ({})", heatmap.metric, better)?;
    writeln!(f, "----------------------------------------")?;
    if heatmap.rows.is_empty() {
        return writeln!(f, "No results available.");
    }

    let width = column_width(heatmap.rows.iter().map(|r| r.test_id.as_str()), "Test");
    let columns: Vec<&str> = heatmap.models.iter().map(|m| short_id(m)).collect();
    let cell = column_width(columns.iter().copied(), "").max(8);

    write!(f, "{:<width$}", "Test")?;
    for column in &columns {
        write!(f, " {:>cell$}", column)?;
    }
    writeln!(f)?;

    for row in &heatmap.rows {
        write!(f, "{:<width$}", row.test_id)?;
        for entry in &row.cells {
            let text = match entry {
                Some(heat) => heat_text(heatmap.metric, heat.value),
                None => "-".to_string(),
            };
            write!(f, " {:>cell$}", text)?;
        }
        writeln!(f)?;
    }
    Ok(())
}

fn heat_text(metric: Metric, value: f64) -> String {
    match metric {
        Metric::Success if value >= 100.0 => "✓".to_string(),
        Metric::Success => "✗".to_string(),
        _ => format!("{:.0}{}", value, metric.unit()),
    }
}

fn write_cards(f: &mut fmt::Formatter<'_>, cards: &[Card<'_>]) -> fmt::Result {
    for card in cards {
        let record = card.record;
        let marker = if card.expanded { "▾" } else { "▸" };
        writeln!(
            f,
            "{} {} [{}] {} / {}  {}ms {}t  ({})",
            marker,
            record.model_id,
            record.prompt_id,
            record.test_id,
            record.id,
            format_number(record.latency()),
            record.tokens(),
            card.status
        )?;
        let content = record
            .output_content
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or("No output");
        writeln!(f, "  {}", content)?;

        if card.expanded {
            writeln!(f, "  Input messages:")?;
            write_messages(f, &record.input_messages)?;
            writeln!(f, "  Output messages:")?;
            write_messages(f, &record.output_messages)?;
            writeln!(
                f,
                "  Completion tokens: {} | Prompt tokens: {} | Total tokens: {} | Created: {}",
                record.completion_tokens.unwrap_or(0),
                record.prompt_tokens.unwrap_or(0),
                record.tokens(),
                or_dash(&record.created_at)
            )?;
        }
        writeln!(f)?;
    }
    Ok(())
}

fn write_messages(f: &mut fmt::Formatter<'_>, messages: &[Message]) -> fmt::Result {
    if messages.is_empty() {
        return writeln!(f, "    (none)");
    }
    for message in messages {
        let content = message
            .content
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or("No content");
        writeln!(f, "    {}: {}", message.role.to_uppercase(), content)?;
        for call in message.tool_calls.iter().flatten() {
            writeln!(f, "      ↳ {} {}", call.function.name, call.function.arguments)?;
        }
    }
    Ok(())
}

/// Latency without a trailing `.0` for whole numbers
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EvaluationDetail, EvaluationSummary, FunctionCall, ResultRecord, Summary, ToolCall};
    use crate::source::{ResultsSource, SourceError};
    use crate::view::{ViewMode, ViewState};
    use crate::viewer::Viewer;
    use async_trait::async_trait;

    // Viewer::render never touches the source
    struct NoSource;

    #[async_trait]
    impl ResultsSource for NoSource {
        async fn list(&self) -> Result<Vec<EvaluationSummary>, SourceError> {
            Ok(Vec::new())
        }

        async fn detail(&self, filename: &str) -> Result<EvaluationDetail, SourceError> {
            Err(SourceError::NotFound(filename.to_string()))
        }

        async fn health(&self) -> Result<Health, SourceError> {
            Err(SourceError::Status(503))
        }
    }

    fn create_test_detail() -> EvaluationDetail {
        let record = |id: &str, model: &str, test: &str, latency: f64, content: &str| ResultRecord {
            id: id.to_string(),
            model_id: model.to_string(),
            prompt_id: "default".to_string(),
            test_id: test.to_string(),
            latency_ms: Some(latency),
            completion_tokens: Some(30),
            prompt_tokens: Some(20),
            total_tokens: Some(50),
            output_content: Some(content.to_string()),
            input_messages: vec![Message {
                role: "user".to_string(),
                content: Some("What's the weather in Paris?".to_string()),
                tool_calls: None,
            }],
            output_messages: vec![Message {
                role: "assistant".to_string(),
                content: None,
                tool_calls: Some(vec![ToolCall {
                    function: FunctionCall {
                        name: "get_weather".to_string(),
                        arguments: r#"{"city":"Paris"}"#.to_string(),
                    },
                }]),
            }],
            created_at: "2025-07-01T19:24:46".to_string(),
        };

        EvaluationDetail {
            summary: Summary::default(),
            results: vec![
                record("1", "gpt-4o-mini-creative", "weather", 300.0, "Sunny"),
                record("2", "claude-3", "weather", 120.0, "Cloudy"),
                record("3", "gpt-4o-mini-creative", "math", 200.0, ""),
            ],
        }
    }

    fn render(detail: &EvaluationDetail, state: &ViewState) -> String {
        let viewer = Viewer::new(Box::new(NoSource), 6);
        PlainView(&viewer.render("results_1.json", detail, state)).to_string()
    }

    #[test]
    fn test_plain_overview() {
        let text = render(&create_test_detail(), &ViewState::default());
        assert!(text.starts_with("=== results 1 ==="));
        assert!(text.contains("MODEL PERFORMANCE RANKING"));
        assert!(text.contains("#1"));
        assert!(text.contains("claude-3"));
        assert!(text.contains("creative"));
        assert!(text.contains("TEST COVERAGE"));
    }

    #[test]
    fn test_plain_heatmap() {
        let mut state = ViewState::new(ViewMode::Heatmap);
        state.metric = Metric::Latency;
        let text = render(&create_test_detail(), &state);
        assert!(text.contains("HEATMAP: latency (lower is better)"));
        assert!(text.contains("300ms"));
        assert!(text.contains("120ms"));
        // claude-3 has no math result
        let math = text.lines().find(|l| l.starts_with("math")).unwrap();
        assert!(math.trim_end().ends_with('-'));
    }

    #[test]
    fn test_plain_success_heatmap() {
        let mut state = ViewState::new(ViewMode::Heatmap);
        state.metric = Metric::Success;
        let text = render(&create_test_detail(), &state);
        assert!(text.contains('✓'));
        assert!(text.contains('✗'));
    }

    #[test]
    fn test_plain_list_expanded_card() {
        let state = ViewState::new(ViewMode::List).toggle_expanded("1");
        let text = render(&create_test_detail(), &state);
        assert!(text.contains("▾ gpt-4o-mini-creative [default] weather / 1"));
        assert!(text.contains("USER: What's the weather in Paris?"));
        assert!(text.contains(r#"↳ get_weather {"city":"Paris"}"#));
        assert!(text.contains("Completion tokens: 30"));
        assert!(text.contains("No output"));
        assert!(text.contains("(incomplete)"));
    }

    #[test]
    fn test_plain_focused_requires_test() {
        let text = render(&create_test_detail(), &ViewState::new(ViewMode::Focused));
        assert!(text.contains("Select a test to compare"));
    }

    #[test]
    fn test_plain_focused() {
        let mut state = ViewState::new(ViewMode::Focused);
        state.compare_test = "weather".to_string();
        let text = render(&create_test_detail(), &state);
        assert!(text.contains("Comparing weather across all models"));
        assert!(text.contains("2 results (fastest first)"));
        let claude = text.find("▸ claude-3").unwrap();
        let gpt = text.find("▸ gpt-4o-mini-creative").unwrap();
        assert!(claude < gpt);
    }

    #[test]
    fn test_plain_empty_evaluation() {
        let text = render(&EvaluationDetail::default(), &ViewState::default());
        assert!(text.contains("No results available."));
        assert!(text.contains("No tests available."));
    }

    #[test]
    fn test_plain_list_of_evaluations() {
        let list = EvaluationList {
            evaluations: vec![EvaluationSummary {
                filename: "results_20250701_192446.json".to_string(),
                path: "results/results_20250701_192446.json".to_string(),
                summary: Summary {
                    total_results: Some(12),
                    avg_latency: Some(812.4),
                    count_models: Some(3),
                    count_prompts: Some(2),
                    ..Default::default()
                },
                created_at: "2025-07-01T19:24:46".to_string(),
                file_size: 2048,
            }],
            total_results: 12,
        };

        let text = PlainList(&list).to_string();
        assert!(text.contains("1 evaluations, 12 results"));
        assert!(text.contains("results 20250701 192446  (results_20250701_192446)"));
        assert!(text.contains("Models: 3 | Prompts: 2 | Results: 12"));
        assert!(text.contains("Avg latency: 812ms"));
    }

    #[test]
    fn test_plain_empty_list() {
        let list = EvaluationList {
            evaluations: vec![],
            total_results: 0,
        };
        assert!(PlainList(&list).to_string().contains("No evaluations found."));
    }

    #[test]
    fn test_json_output() {
        let detail = create_test_detail();
        let viewer = Viewer::new(Box::new(NoSource), 6);
        let view = viewer.render("results_1.json", &detail, &ViewState::default());
        // This test ensures JSON serialization works without panicking
        print_view(&view, OutputFormat::Json);
        print_view(&view, OutputFormat::Plain);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(120.0), "120");
        assert_eq!(format_number(120.3), "120.3");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json", true).unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }
}
