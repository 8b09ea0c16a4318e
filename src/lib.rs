pub mod backend;
pub mod config;
pub mod instruction;
pub mod models;
pub mod processor;
mod progress;
mod utils;
pub mod view;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use backend::backend_from_config;
use config::{AppConfig, BackendKind};
use instruction::ExtractionInstruction;
use models::Query;
use processor::{ExtractionError, QueryProcessor};
use view::{OutputFormat, SearchOutcome, SearchView, Severity};

const ABOUT: &str = "Find events related to biotech, agriculture tech, and tech on Eventbrite.";

#[derive(Debug, Parser)]
#[command(name = "event-scout", version, about = ABOUT)]
pub struct Cli {
    /// Search query, e.g. "San Francisco tech events". Prompted for when omitted.
    pub query: Option<String>,

    /// How to print the events
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Extraction backend to query
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Endpoint of the http extraction backend
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Give up on the search after this many seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Simulated latency of the mock backend
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Keyword to filter events by; repeat to give several (defaults to biotech, agriculture tech, tech)
    #[arg(long = "keyword", value_name = "KEYWORD")]
    pub keywords: Vec<String>,

    /// Print the extraction instruction before searching
    #[arg(long)]
    pub show_instruction: bool,

    /// Config file to read instead of the default location
    #[arg(long, env = "EVENT_SCOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also log debug detail (request endpoints, worker timing)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.trim().to_string());
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(latency) = self.latency_ms {
            config.latency_ms = latency;
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("search aborted: {err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("event_scout_lib={level}")
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn execute(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("failed to load configuration")?;
    cli.apply_overrides(&mut config);

    let raw_query = match &cli.query {
        Some(query) => query.clone(),
        None => prompt_for_query().context("failed to read the search query")?,
    };

    let mut view = SearchView::new();
    let Some(query) = view.begin(&raw_query) else {
        present(&view, cli.format);
        return Ok(exit_code(&view));
    };

    let backend = backend_from_config(&config).context("failed to configure extraction backend")?;
    let processor = Arc::new(QueryProcessor::new(backend));
    let instruction = ExtractionInstruction::default()
        .with_keywords(&cli.keywords)
        .render();

    if cli.show_instruction {
        eprintln!("Using the following instruction for the AI agent:\n\n{instruction}\n");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let outcome = runtime.block_on(search(
        Arc::clone(&processor),
        query,
        instruction,
        config.timeout(),
    ));
    // A timed-out backend may still be sleeping or waiting on the network.
    runtime.shutdown_background();

    view.finish(outcome);
    present(&view, cli.format);
    let code = exit_code(&view);
    view.acknowledge();
    Ok(code)
}

fn prompt_for_query() -> io::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "Enter your search query: ")?;
    stderr.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

async fn search(
    processor: Arc<QueryProcessor>,
    query: Query,
    instruction: String,
    timeout: Duration,
) -> SearchOutcome {
    info!(
        backend = processor.backend_name(),
        timeout_secs = timeout.as_secs(),
        "starting search"
    );
    let spinner = progress::create_spinner("Searching for events...");

    let worker_query = query.clone();
    let task =
        tokio::task::spawn_blocking(move || processor.process(&worker_query, &instruction));

    let outcome = tokio::select! {
        joined = tokio::time::timeout(timeout, task) => match joined {
            Ok(Ok(result)) => SearchOutcome::from_result(query, result),
            Ok(Err(err)) => SearchOutcome::Failed(ExtractionError::Unavailable(format!(
                "extraction worker stopped: {err}"
            ))),
            Err(_) => SearchOutcome::TimedOut(timeout),
        },
        _ = tokio::signal::ctrl_c() => SearchOutcome::Cancelled,
    };

    spinner.finish_and_clear();
    outcome
}

fn present(view: &SearchView, format: OutputFormat) {
    let stdout = io::stdout();
    let stderr = io::stderr();
    let written = write_outcome(view, format, &mut stdout.lock(), &mut stderr.lock());
    if let Err(err) = ignore_broken_pipe(written) {
        warn!(error = %err, "failed to write search results");
    }
}

fn write_outcome<O, E>(
    view: &SearchView,
    format: OutputFormat,
    out: &mut O,
    err: &mut E,
) -> io::Result<()>
where
    O: Write,
    E: Write,
{
    let Some(outcome) = view.outcome() else {
        return Ok(());
    };

    let message = outcome.message();
    match (outcome.severity(), format) {
        (Severity::Warning | Severity::Error, _) | (_, OutputFormat::Json) => {
            writeln!(err, "{message}")?
        }
        _ => writeln!(out, "{message}")?,
    }

    if let Some(body) = view.body(format) {
        writeln!(out, "{body}")?;
    }
    out.flush()
}

/// A closed pipe on the reading end (`event-scout tech | head -3`) is a
/// normal way for output to stop.
fn ignore_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn exit_code(view: &SearchView) -> ExitCode {
    view.outcome()
        .map(SearchOutcome::exit_code)
        .unwrap_or(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ExtractionBackend;

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "event-scout",
            "--backend",
            "http",
            "--endpoint",
            " http://localhost:7000/extract ",
            "--timeout-secs",
            "3",
            "--latency-ms",
            "10",
            "Austin tech",
        ])
        .expect("valid arguments");

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(cli.query.as_deref(), Some("Austin tech"));
        assert_eq!(config.backend, BackendKind::Http);
        assert_eq!(
            config.endpoint.as_deref(),
            Some("http://localhost:7000/extract")
        );
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.latency(), Duration::from_millis(10));
    }

    #[test]
    fn defaults_leave_config_alone() {
        let cli = Cli::try_parse_from(["event-scout"]).expect("no arguments");
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config, AppConfig::default());
        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.query.is_none());
    }

    #[test]
    fn default_log_filter_is_info() {
        assert_eq!(default_directive(false), "event_scout_lib=info");
        assert_eq!(default_directive(true), "event_scout_lib=debug");
    }

    #[test]
    fn zero_timeout_flag_is_rejected() {
        assert!(Cli::try_parse_from(["event-scout", "--timeout-secs", "0", "tech"]).is_err());
    }

    #[test]
    fn keyword_flags_reach_the_instruction() {
        let cli = Cli::try_parse_from([
            "event-scout",
            "--keyword",
            "robotics",
            "--keyword",
            "climate tech",
            "Seattle",
        ])
        .expect("valid arguments");
        let text = ExtractionInstruction::default()
            .with_keywords(&cli.keywords)
            .render();
        assert!(text.contains("'robotics', or 'climate tech'"));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    fn found_view() -> SearchView {
        let mut view = SearchView::new();
        let query = view.begin("tech").expect("non-empty query");
        let events = backend::mock::FixedMockBackend::new()
            .with_latency(Duration::ZERO)
            .extract(&query, "instruction");
        view.finish(SearchOutcome::from_result(query, events));
        view
    }

    #[test]
    fn writes_message_and_table_to_stdout() {
        let view = found_view();
        let mut out = Vec::new();
        let mut err = Vec::new();
        write_outcome(&view, OutputFormat::Table, &mut out, &mut err).expect("write outcome");
        let out = String::from_utf8(out).expect("utf8 output");
        assert!(out.starts_with("Events found!\n"));
        assert!(out.contains("Next-Gen Tech Solutions Expo"));
        assert!(err.is_empty());
    }

    #[test]
    fn closed_stdout_is_not_an_error() {
        let view = found_view();
        let written = write_outcome(&view, OutputFormat::Table, &mut ClosedPipe, &mut io::sink());
        assert_eq!(
            written.as_ref().map_err(io::Error::kind),
            Err(io::ErrorKind::BrokenPipe)
        );
        assert!(ignore_broken_pipe(written).is_ok());
        assert!(ignore_broken_pipe(Err(io::Error::from(io::ErrorKind::PermissionDenied))).is_err());
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["event-scout", "--format", "csv", "tech"]).is_err());
    }

    #[tokio::test]
    async fn search_returns_fixed_events() {
        let processor = Arc::new(QueryProcessor::new(Box::new(
            backend::mock::FixedMockBackend::new().with_latency(Duration::ZERO),
        )));
        let query = Query::new("San Francisco tech events").expect("non-empty query");
        let outcome = search(
            processor,
            query,
            ExtractionInstruction::default().render(),
            Duration::from_secs(5),
        )
        .await;
        match outcome {
            SearchOutcome::Found(events) => assert_eq!(events.len(), 4),
            other => panic!("expected events, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_times_out() {
        let processor = Arc::new(QueryProcessor::new(Box::new(
            backend::mock::FixedMockBackend::new().with_latency(Duration::from_millis(500)),
        )));
        let query = Query::new("tech").expect("non-empty query");
        let outcome = search(
            processor,
            query,
            "instruction".to_string(),
            Duration::from_millis(20),
        )
        .await;
        assert_eq!(outcome, SearchOutcome::TimedOut(Duration::from_millis(20)));
    }
}
