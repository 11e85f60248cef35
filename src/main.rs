//! FastFind command line front end.
//!
//! A terminal stand-in for the editor host: it confirms a search request,
//! runs one session, and prints the pickable result list. Past searches
//! can be re-displayed from the persisted history with `--recall`.

use anyhow::{bail, Context, Result};
use clap::Parser;
use fastfind::{
    host, DisplayItem, HistoryStore, ResultStore, SearchConfiguration, SearchHost, SearchQuery,
    SessionController, SessionState,
};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Parser)]
#[command(name = "fastfind", about = "Find text fast with a search executable")]
struct Cli {
    /// Search term
    term: String,

    /// Search path; defaults to the project root or the current directory
    #[arg(long)]
    path: Option<String>,

    /// Settings file (JSON). Built-in defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ignore case for this search regardless of the settings file
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Project root hint for path and history resolution
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Re-display the stored results for the term instead of searching
    #[arg(long)]
    recall: bool,
}

/// Terminal implementation of the host boundary.
struct CliHost {
    show_progress: bool,
    printed_progress: Mutex<bool>,
}

impl CliHost {
    fn new() -> Self {
        Self {
            show_progress: io::stderr().is_terminal(),
            printed_progress: Mutex::new(false),
        }
    }

    fn clear_progress(&self) {
        let mut printed = self.printed_progress.lock().unwrap();
        if *printed {
            eprint!("\r          \r");
            *printed = false;
        }
    }
}

impl SearchHost for CliHost {
    fn progress(&self, indicator: &str) {
        if self.show_progress {
            eprint!("\r{}", indicator);
            let _ = io::stderr().flush();
            *self.printed_progress.lock().unwrap() = true;
        }
    }

    fn publish(&self, items: Vec<DisplayItem>, summary: &str) {
        self.clear_progress();
        print_items(&items, summary);
    }

    fn error(&self, message: &str) {
        self.clear_progress();
        eprintln!("fastfind: {}", message);
    }

    fn cancelled(&self) {
        self.clear_progress();
    }
}

fn print_items(items: &[DisplayItem], summary: &str) {
    for item in items {
        println!("{}", item.label);
    }
    println!("{}", summary);
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SearchConfiguration::load(path)?,
        None => SearchConfiguration::default(),
    };
    if cli.ignore_case {
        config.case_sensitive = false;
    }

    let history_path = fastfind::resolve_history_path(
        cli.project_root.as_deref(),
        config.history_file.as_deref(),
    );
    let history = HistoryStore::load_or_default(history_path);
    let store = ResultStore::new(history);

    if cli.recall {
        let results = store
            .history()
            .get(&cli.term)
            .context("no stored results for that term")?;
        let items: Vec<DisplayItem> = results.iter().map(DisplayItem::from_record).collect();
        print_items(
            &items,
            &format!("recalled {} occurrences of '{}'", items.len(), cli.term),
        );
        return Ok(());
    }

    let path = match cli.path {
        Some(path) => path,
        None => host::resolve_search_path(cli.project_root.as_deref(), None, None)
            .unwrap_or_else(|| PathBuf::from("."))
            .to_string_lossy()
            .into_owned(),
    };

    let controller = SessionController::new(config, store);
    let cli_host = CliHost::new();
    let state = controller
        .run(SearchQuery::new(cli.term, path), &cli_host)
        .await;

    if state == SessionState::Failed {
        bail!("search failed");
    }
    Ok(())
}
