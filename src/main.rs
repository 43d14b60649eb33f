use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

mod aggregate;
mod comparison;
mod config;
mod filter;
mod matrix;
mod models;
mod normalize;
mod output;
mod source;
mod status;
mod view;
mod viewer;

use crate::config::Config;
use crate::normalize::Metric;
use crate::output::OutputFormat;
use crate::source::{ApiSource, DirectorySource, ResultsSource};
use crate::view::{ViewMode, ViewState};
use crate::viewer::Viewer;

/// AI Model Evaluation Viewer - Browse evaluation results and compare models
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to the TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the results API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Read result files from this directory instead of the API
    #[arg(long, global = true)]
    results_dir: Option<PathBuf>,

    /// Output format: plain or json
    #[arg(short, long, global = true)]
    output: Option<OutputFormat>,

    /// Verbose output - log every request and view computation
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all evaluations, newest first
    List,
    /// Show one evaluation
    Show(ShowArgs),
    /// Check that the results API is reachable
    Health,
}

#[derive(clap::Args, Debug)]
struct ShowArgs {
    /// Evaluation filename, with or without `.json`
    evaluation: String,

    /// View to render
    #[arg(long, value_enum, default_value_t = ViewMode::Overview)]
    view: ViewMode,

    /// Metric shown by the heatmap
    #[arg(long, value_enum, default_value_t = Metric::Latency)]
    metric: Metric,

    /// Only list results of this model (repeatable, list view)
    #[arg(long = "model")]
    models: Vec<String>,

    /// Only list results of this prompt (repeatable, list view)
    #[arg(long = "prompt")]
    prompts: Vec<String>,

    /// Only list results of this test (repeatable, list view)
    #[arg(long = "test")]
    tests: Vec<String>,

    /// Case-insensitive search over ids and output (all views but list)
    #[arg(long, default_value = "")]
    search: String,

    /// Test to compare in the focused view
    #[arg(long, default_value = "")]
    compare_test: String,

    /// Model to include in the focused comparison (repeatable, default all)
    #[arg(long = "compare-model")]
    compare_models: Vec<String>,

    /// Expand the result card with this id (repeatable)
    #[arg(long = "expand")]
    expanded: Vec<String>,
}

impl ShowArgs {
    fn view_state(&self) -> ViewState {
        let mut state = ViewState::new(self.view);
        state.selection.models.extend(self.models.iter().cloned());
        state.selection.prompts.extend(self.prompts.iter().cloned());
        state.selection.tests.extend(self.tests.iter().cloned());
        state.search = self.search.clone();
        state.metric = self.metric;
        state.compare_test = self.compare_test.clone();
        for model in &self.compare_models {
            if !state.compare_models.contains(model) {
                state = state.toggle_compare_model(model);
            }
        }
        for result_id in &self.expanded {
            if !state.is_expanded(result_id) {
                state = state.toggle_expanded(result_id);
            }
        }
        state
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Pick the results source from flags, falling back to the config file
fn build_source(args: &Args, config: &Config) -> Result<Box<dyn ResultsSource>> {
    if let Some(dir) = args.results_dir.as_ref().or(config.results_dir.as_ref()) {
        log::debug!("Reading results from {}", dir.display());
        return Ok(Box::new(DirectorySource::new(dir)));
    }

    let base_url = args.api_url.as_deref().unwrap_or(&config.api_base_url);
    log::debug!("Reading results from {}", base_url);
    let source = ApiSource::new(base_url, Duration::from_secs(config.timeout_secs))
        .with_context(|| format!("Failed to create API client for {}", base_url))?;
    Ok(Box::new(source))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = Config::load(args.config.as_deref())?;
    let format = args.output.unwrap_or(config.output);
    let viewer = Viewer::new(build_source(&args, &config)?, config.coverage_columns);

    match &args.command {
        Command::List => {
            let list = viewer.list_evaluations().await?;
            output::print_list(&list, format);
        }
        Command::Show(show) => {
            let detail = viewer.load_evaluation(&show.evaluation).await?;
            let view = viewer.render(&show.evaluation, &detail, &show.view_state());
            output::print_view(&view, format);
        }
        Command::Health => {
            let health = viewer.health().await?;
            output::print_health(&health, format);
        }
    }

    Ok(())
}
