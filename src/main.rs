use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use entity_lookup::formatters::{format_selection, format_snapshot, selection_json, snapshot_json};
use entity_lookup::{
    InMemoryProvider, LookupConfig, LookupSnapshot, SearchController, SelectionChange,
    expand_tilde, logging,
};
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(
    name = "entity-lookup",
    version,
    about = "Typeahead entity lookup over a local data file",
    long_about = None
)]
struct Cli {
    /// Search term: an 11-digit ABN, a 9-digit ACN, or part of a name
    #[arg(required_unless_present_any = ["replay", "help_query"])]
    query: Option<String>,

    /// Entity file (JSON array or JSONL of {id, label, payload})
    #[arg(short, long, env = "ENTITY_LOOKUP_DATA", required_unless_present = "help_query")]
    data: Option<String>,

    /// Lookup settings file (JSON)
    #[arg(short, long, env = "ENTITY_LOOKUP_CONFIG")]
    config: Option<String>,

    /// Page of results to show (1-based)
    #[arg(short, long, default_value = "1")]
    page: usize,

    /// Rows per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Maximum number of results requested from the provider
    #[arg(short = 'n', long)]
    max_results: Option<usize>,

    /// Payload filter, repeatable (e.g. --filter state=NSW)
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,

    /// Quiet period before a search is sent
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Delay before the dropdown closes after blur
    #[arg(long)]
    blur_grace_ms: Option<u64>,

    /// Give up on a search after this long
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Select the result with this id and print the selection event
    #[arg(long)]
    select: Option<String>,

    /// Read a keystroke script from stdin instead of a single query
    #[arg(long)]
    replay: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show how search terms are classified
    #[arg(long)]
    help_query: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    JsonL,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid filter `{raw}`, expected key=value"))?;
    if key.trim().is_empty() {
        return Err(format!("invalid filter `{raw}`, key is empty"));
    }
    Ok((key.trim().to_string(), value.trim().to_string()))
}

impl Cli {
    fn lookup_config(&self) -> Result<LookupConfig> {
        let mut config = match &self.config {
            Some(path) => LookupConfig::from_file(&expand_tilde(path))?,
            None => LookupConfig::default(),
        };

        if let Some(size) = self.page_size {
            config.page_size = size;
        }
        if let Some(max) = self.max_results {
            config.max_results = max;
        }
        if let Some(ms) = self.debounce_ms {
            config.debounce_ms = ms;
        }
        if let Some(ms) = self.blur_grace_ms {
            config.blur_grace_ms = ms;
        }
        if self.timeout_ms.is_some() {
            config.request_timeout_ms = self.timeout_ms;
        }
        config.filters.extend(self.filters.iter().cloned());
        Ok(config)
    }
}

/// Collects output in the requested format. JSON is written once at the end.
struct Output {
    format: OutputFormat,
    use_color: bool,
    collected: Vec<Value>,
}

impl Output {
    fn snapshot(&mut self, step: Option<&str>, snapshot: &LookupSnapshot) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                if let Some(step) = step {
                    println!("> {step}");
                }
                print!("{}", format_snapshot(snapshot, self.use_color));
            }
            OutputFormat::Json | OutputFormat::JsonL => {
                let mut value = snapshot_json(snapshot);
                if let Some(step) = step {
                    value["step"] = Value::from(step);
                }
                self.emit(value)?;
            }
        }
        Ok(())
    }

    fn selection(&mut self, change: &SelectionChange) -> Result<()> {
        match self.format {
            OutputFormat::Text => println!("{}", format_selection(change, self.use_color)),
            OutputFormat::Json | OutputFormat::JsonL => self.emit(selection_json(change))?,
        }
        Ok(())
    }

    fn emit(&mut self, value: Value) -> Result<()> {
        if self.format == OutputFormat::JsonL {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer(&mut handle, &value)?;
            writeln!(&mut handle)?;
        } else {
            self.collected.push(value);
        }
        Ok(())
    }

    fn finish(self) -> Result<()> {
        if self.format == OutputFormat::Json {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let output = if self.collected.len() == 1 {
                self.collected.into_iter().next().unwrap_or_default()
            } else {
                Value::Array(self.collected)
            };
            serde_json::to_writer_pretty(&mut handle, &output)?;
            writeln!(&mut handle)?;
        }
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_tracing(cli.verbose);

    if cli.help_query {
        print_query_help();
        return Ok(());
    }

    let data = cli
        .data
        .as_deref()
        .context("--data is required (or set ENTITY_LOOKUP_DATA)")?;
    let provider = Arc::new(InMemoryProvider::from_path(&expand_tilde(data))?);
    let config = cli.lookup_config()?;

    if cli.verbose {
        eprintln!("Loaded {} entities from {data}", provider.len());
    }

    let mut controller = SearchController::new(provider, config);
    let selections = controller
        .take_selections()
        .context("selection stream already taken")?;
    let mut output = Output {
        format: cli.format,
        use_color: !cli.no_color,
        collected: Vec::new(),
    };

    let failed = if cli.replay {
        replay(&mut controller, selections, &mut output).await?;
        false
    } else {
        let query = cli.query.as_deref().unwrap_or_default();
        single_lookup(&mut controller, &cli, query, selections, &mut output).await?
    };

    controller.shutdown();
    output.finish()?;

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Returns `true` when the lookup ended in an error.
async fn single_lookup(
    controller: &mut SearchController<InMemoryProvider>,
    cli: &Cli,
    query: &str,
    mut selections: mpsc::UnboundedReceiver<SelectionChange>,
    output: &mut Output,
) -> Result<bool> {
    controller.on_focus();
    controller.on_input(query);
    controller.settle().await;

    if cli.page > 1 {
        controller.go_to_page(cli.page);
    }

    let snapshot = controller.snapshot();
    if snapshot.error.is_some() {
        output.snapshot(None, &snapshot)?;
        return Ok(true);
    }

    if let Some(id) = &cli.select {
        if controller.on_select(id).is_none() {
            bail!("No result with id `{id}` for query \"{query}\"");
        }
        while let Ok(event) = selections.try_recv() {
            output.selection(&event)?;
        }
        return Ok(false);
    }

    output.snapshot(None, &snapshot)?;
    Ok(false)
}

async fn run_for(controller: &mut SearchController<InMemoryProvider>, duration: Duration) {
    let deadline = tokio::time::Instant::now() + duration;
    while tokio::time::timeout_at(deadline, controller.next_event())
        .await
        .is_ok()
    {}
}

async fn replay(
    controller: &mut SearchController<InMemoryProvider>,
    mut selections: mpsc::UnboundedReceiver<SelectionChange>,
    output: &mut Output,
) -> Result<()> {
    let stdin = io::stdin();
    for (number, line) in stdin.lock().lines().enumerate() {
        let line = line.context("Failed to read replay script")?;
        let step = line.trim_end();

        match step.split_once(' ').unwrap_or((step, "")) {
            (":focus", _) => controller.on_focus(),
            (":blur", _) => controller.on_blur(),
            (":next", _) => controller.next_page(),
            (":prev", _) => controller.previous_page(),
            (":settle", _) => controller.settle().await,
            (":wait", ms) => {
                let ms: u64 = ms
                    .trim()
                    .parse()
                    .with_context(|| format!("line {}: `:wait` needs milliseconds", number + 1))?;
                run_for(controller, Duration::from_millis(ms)).await;
            }
            (":page", n) => {
                let n: usize = n
                    .trim()
                    .parse()
                    .with_context(|| format!("line {}: `:page` needs a number", number + 1))?;
                controller.go_to_page(n);
            }
            (":clear", _) => controller.clear_selection(),
            (":select", id) => {
                controller.on_select(id.trim());
            }
            (directive, _) if directive.starts_with(':') => {
                bail!("line {}: unknown directive `{directive}`", number + 1);
            }
            _ => controller.on_input(step),
        }

        controller.pump_ready();
        while let Ok(event) = selections.try_recv() {
            output.selection(&event)?;
        }
        output.snapshot(Some(step), &controller.snapshot())?;
    }
    Ok(())
}

fn print_query_help() {
    println!(
        r#"Entity Lookup Query Help

SEARCH MODES:
  51824753556       11 digits: exact ABN lookup
  004085616         9 digits: exact ACN lookup
  acme              anything else: name search (case-insensitive substring)

RULES:
  - Leading and trailing whitespace is ignored
  - Name searches need at least 2 characters
  - Digit strings of any other length are searched as names
  - Stored ids may contain spaces (51 824 753 556); type the digits only

REPLAY SCRIPT (--replay, one step per line on stdin):
  <text>            Replace the field contents
  :focus / :blur    Focus or leave the field
  :wait <ms>        Let timers and searches run for <ms>
  :settle           Run until no search or timer is pending
  :select <id>      Pick a result from the open dropdown
  :clear            Drop the current selection ("change entity")
  :next / :prev     Move between result pages
  :page <n>         Jump to page <n>

EXAMPLES:
  entity-lookup acme --data entities.jsonl
  entity-lookup 51824753556 --data entities.json --format json
  entity-lookup harbour --data entities.jsonl --filter state=NSW --page 2"#
    );
}
