//! Command line entry point for `rusty-book`.

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use duckdb::Connection;
use rusty_book::convert_book;
use rusty_book::service::BookService;
use rusty_book::service::Delivery;
use rusty_book::service::ServiceConfig;
use rusty_book::service::DEFAULT_BROWSE_LIMIT;
use rusty_book::Book;
use rusty_book::Schema;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rusty-book",
    about = "Convert spreadsheet books into DuckDB databases with typed tables, join tables and views"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a database from a local or remote book document
    Build {
        /// Path or URL of the book JSON
        book: String,
        /// Database file to create
        output: PathBuf,
        /// Replace the output file if it exists
        #[arg(long)]
        force: bool,
    },
    /// Print the inferred tables and columns of a book
    Analyze {
        /// Path or URL of the book JSON
        book: String,
    },
    /// Reuse or build the cached database of a book id and report how to deliver it
    Fetch {
        /// Book id, optionally with a `.db` suffix
        id: String,
        /// Deliver the database file itself
        #[arg(long)]
        file: bool,
        #[command(flatten)]
        service: ServiceArgs,
    },
}

#[derive(clap::Args)]
struct ServiceArgs {
    /// Directory holding cached book documents and databases
    #[arg(long, env = "RUSTY_BOOK_CACHE_DIR", default_value = ".")]
    cache_dir: PathBuf,
    /// Base URL book documents are downloaded from
    #[arg(long, env = "RUSTY_BOOK_SOURCE_URL", default_value = "https://fieldbook.com/books")]
    source_url: String,
    /// Public base URL of this service
    #[arg(long, env = "RUSTY_BOOK_SERVICE_URL")]
    service_url: Option<String>,
    /// Browsing tool the database URL is handed to
    #[arg(long, env = "RUSTY_BOOK_VIEWER_URL", default_value = "http://fiatjaf.alhur.es/sqlite-viewer/")]
    viewer_url: String,
    /// Largest database, in bytes, still sent to the browsing tool
    #[arg(long, env = "RUSTY_BOOK_BROWSE_LIMIT", default_value_t = DEFAULT_BROWSE_LIMIT)]
    browse_limit: u64,
}

impl From<ServiceArgs> for ServiceConfig {
    fn from(args: ServiceArgs) -> Self {
        ServiceConfig {
            cache_dir: args.cache_dir,
            source_url: args.source_url,
            service_url: args.service_url,
            viewer_url: args.viewer_url,
            browse_limit: args.browse_limit,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Build { book, output, force } => build(&book, output, force),
        Command::Analyze { book } => analyze(&book),
        Command::Fetch { id, file, service } => fetch(&id, file, service.into()),
    }
}

fn build(location: &str, output: PathBuf, force: bool) -> Result<()> {
    if output.exists() {
        if !force {
            bail!("{} already exists, pass --force to replace it", output.display());
        }
        std::fs::remove_file(&output).with_context(|| format!("Failed to remove {}", output.display()))?;
    }
    let book = Book::open(location).with_context(|| format!("Failed to read book {location}"))?;
    let connection =
        Connection::open(&output).with_context(|| format!("Failed to open {}", output.display()))?;
    let schema = convert_book(&book, &connection).context("Failed to build database")?;
    info!(
        tables = schema.tables.len(),
        joins = schema.joins.len(),
        path = %output.display(),
        "database built"
    );
    Ok(())
}

fn analyze(location: &str) -> Result<()> {
    let book = Book::open(location).with_context(|| format!("Failed to read book {location}"))?;
    book.validate()?;
    let schema = Schema::resolve(&book)?;
    for (table, column, kind) in schema.describe() {
        println!("{table}\t{column}\t{kind}");
    }
    Ok(())
}

fn fetch(id: &str, file: bool, config: ServiceConfig) -> Result<()> {
    let service = BookService::new(config);
    let path = service.prepare(id).with_context(|| format!("Failed to prepare book {id}"))?;
    info!(book = id, path = %path.display(), "database ready");
    match service.delivery(id, file)? {
        Delivery::File { path, headers } => {
            for (name, value) in headers {
                println!("{name}: {value}");
            }
            println!("{}", path.display());
        }
        Delivery::Browse { viewer_url } => println!("{viewer_url}"),
        Delivery::TooLarge { download_url } => println!(
            "Your book is too large to be browsable in the browser. Download the database on {download_url} and browse it using a local program."
        ),
    }
    Ok(())
}
