//! todo - terminal front end for the to-do list
//!
//! Every invocation loads the first page and stats, runs one command through
//! the store, and prints the resulting snapshot.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod config;
mod view;

use config::Config;
use todo_sync::validation::parse_input_date;
use todo_sync::{
    FilterSpec, HttpGateway, Outcome, Priority, TodoForm, TodoItem, TodoStore, UreqTransport,
};

type Store = TodoStore<HttpGateway<UreqTransport>>;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Manage a remote to-do list")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend URL (overrides config)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of to-dos
    List {
        /// Zero-based page number
        #[arg(short, long, default_value_t = 0)]
        page: u32,

        /// Sort field (priority, dueDate); repeat a field to flip it to descending
        #[arg(short, long = "sort")]
        sort: Vec<String>,

        /// Case-insensitive text filter
        #[arg(short, long)]
        text: Option<String>,

        /// Only this priority
        #[arg(long)]
        priority: Option<Priority>,

        /// Only done (true) or open (false) items
        #[arg(long)]
        done: Option<bool>,
    },

    /// Add a to-do
    Add {
        text: String,

        #[arg(short, long, default_value_t = Priority::Medium)]
        priority: Priority,

        /// Due date as YYYY-MM-DD
        #[arg(short, long, value_parser = parse_due)]
        due: Option<NaiveDate>,
    },

    /// Change the text, priority or due date of a to-do on the first page
    Edit {
        id: String,
        text: String,

        /// Keeps the current priority when omitted
        #[arg(short, long)]
        priority: Option<Priority>,

        /// Keeps the current due date when omitted
        #[arg(short, long, value_parser = parse_due)]
        due: Option<NaiveDate>,
    },

    /// Mark a to-do on the first page done, or open again
    Toggle { id: String },

    /// Delete a to-do
    Delete { id: String },

    /// Show completion statistics
    Stats,
}

fn parse_due(input: &str) -> Result<NaiveDate, String> {
    parse_input_date(input).map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("todo_cli=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(url) = cli.base_url {
        cfg.server.base_url = url;
    }

    let transport = match cfg.server.timeout() {
        Some(timeout) => UreqTransport::with_timeout(timeout),
        None => UreqTransport::new(),
    };
    let store = TodoStore::new(HttpGateway::new(&cfg.server.base_url, transport));
    tracing::debug!(base_url = %cfg.server.base_url, "using backend");

    let outcome = run(&store, cli.command).await?;
    print!("{}", view::render(&store.snapshot()));

    Ok(match outcome {
        Outcome::Applied => ExitCode::SUCCESS,
        Outcome::Failed | Outcome::Declined | Outcome::Rejected => ExitCode::FAILURE,
    })
}

/// Run one command and return the outcome of its main step.
async fn run(store: &Store, command: Commands) -> Result<Outcome> {
    if let Commands::List {
        page,
        sort,
        text,
        priority,
        done,
    } = command
    {
        store.set_current_page(page);
        for field in &sort {
            store.set_sort_field(field);
        }
        store.set_filter(Some(FilterSpec { text, priority, done }));
        return Ok(store.fetch_list_and_stats().await.first);
    }

    let loaded = store.fetch_list_and_stats().await;
    if loaded.first != Outcome::Applied {
        return Ok(loaded.first);
    }

    let outcome = match command {
        Commands::List { .. } | Commands::Stats => loaded.stats,
        Commands::Add {
            text,
            priority,
            due,
        } => {
            let form = TodoForm {
                text,
                priority,
                due_date: due,
            };
            store.create_item_and_refresh_stats(&form).await.first
        }
        Commands::Edit {
            id,
            text,
            priority,
            due,
        } => {
            let current = on_page(store, &id)?;
            let form = TodoForm {
                text,
                priority: priority.unwrap_or(current.priority),
                due_date: due.or(current.due_date),
            };
            store.update_item_and_refresh_stats(&id, &form).await.first
        }
        Commands::Toggle { id } => {
            let current = on_page(store, &id)?;
            store.toggle_item_and_refresh_stats(&current).await.first
        }
        Commands::Delete { id } => store.delete_item_and_refresh_stats(&id).await.first,
    };
    Ok(outcome)
}

fn on_page(store: &Store, id: &str) -> Result<TodoItem> {
    store
        .snapshot()
        .items
        .into_iter()
        .find(|i| i.id == id)
        .with_context(|| format!("No to-do with id {id} on the first page"))
}
