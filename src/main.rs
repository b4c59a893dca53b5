//! # Contact Book CLI (`contacts`)
//!
//! ## Usage
//!
//! ```bash
//! contacts --config ./config/contacts.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `contacts init` | Create the SQLite database and run schema migrations |
//! | `contacts serve` | Start the HTTP API |
//! | `contacts list` | Print contacts, optionally filtered |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use contact_book::config;
use contact_book::db;
use contact_book::logging;
use contact_book::migrate;
use contact_book::server;
use contact_book::sqlite_store::SqliteContactStore;
use contact_book_core::{ContactFilter, ContactStore};

/// Contact Book: a small contact-management CRUD API over SQLite.
#[derive(Parser)]
#[command(name = "contacts", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/contacts.toml`. A missing file means the
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/contacts.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `contacts` table. Safe to
    /// run repeatedly.
    Init,

    /// Start the HTTP API on `[server].bind`.
    Serve,

    /// List contacts ordered by first name.
    List {
        /// Case-insensitive substring of first name, last name, or email.
        #[arg(long)]
        search: Option<String>,

        /// Exact category to keep.
        #[arg(long)]
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config(&cli.config)?;
    logging::init_tracing(&cfg.logging);

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::List { search, category } => {
            run_list(&cfg, ContactFilter::new(search, category)).await?;
        }
    }

    Ok(())
}

async fn run_list(cfg: &config::Config, filter: ContactFilter) -> anyhow::Result<()> {
    let pool = db::connect(cfg).await?;
    migrate::run_migrations(&pool).await?;
    let store = SqliteContactStore::new(pool);

    let contacts = store.list(&filter).await?;
    for c in &contacts {
        println!(
            "{:>4}  {} {}  <{}>  {}  [{}]",
            c.id,
            c.first_name,
            c.last_name,
            c.email,
            c.phone.as_deref().unwrap_or("-"),
            c.category.as_deref().unwrap_or("-"),
        );
    }
    println!("{} contact(s)", contacts.len());

    store.pool().close().await;
    Ok(())
}
