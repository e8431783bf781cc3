use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use refmark::config::{get_refmark_dir, load_config, save_config, RefmarkConfig};
use refmark::db::Database;
use refmark::document::Document;
use refmark::errors::{RefmarkError, Result};
use refmark::parser::ParserRegistry;
use refmark::policy::MembershipPolicy;
use refmark::resolution::Coordinator;
use refmark::types::{FixtureSet, Viewer};

/// Reference resolution for rendered rich-text documents.
#[derive(Parser)]
#[command(
    name = "refmark",
    about = "Reference resolution for rendered rich-text documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new refmark workspace
    Init {
        /// Workspace path (default: current directory)
        path: Option<String>,
    },
    /// Load a JSON fixture set into the reference store
    Seed {
        /// Path to the fixtures JSON file
        fixtures: String,
        /// Workspace path
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Resolve a document's references for a viewer
    Resolve {
        /// Path to the document JSON file
        document: String,
        /// Viewer: a user id, or "anonymous"
        #[arg(short, long, default_value = "anonymous")]
        viewer: String,
        /// Workspace path
        #[arg(short, long)]
        path: Option<String>,
        /// Output the full outcome as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Show reference store statistics
    Status {
        /// Workspace path (default: current directory)
        path: Option<String>,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { path } => {
            let workspace = resolve_path(path);
            let config = RefmarkConfig {
                root_dir: workspace.to_string_lossy().to_string(),
                ..RefmarkConfig::default()
            };
            save_config(&workspace, &config)?;
            Database::initialize(&db_path(&workspace))?;
            println!("Initialized refmark workspace at {}", workspace.display());
        }
        Commands::Seed { fixtures, path } => {
            let workspace = resolve_path(path);
            let db = open_database(&workspace)?;
            let contents = std::fs::read_to_string(&fixtures)?;
            let fixtures: FixtureSet = serde_json::from_str(&contents)?;
            db.seed(&fixtures)?;
            let stats = db.get_stats()?;
            println!(
                "Seeded store: {} projects, {} issues, {} merge requests, {} commits, {} labels, {} users",
                stats.project_count,
                stats.issue_count,
                stats.merge_request_count,
                stats.commit_count,
                stats.label_count,
                stats.user_count
            );
        }
        Commands::Resolve {
            document,
            viewer,
            path,
            json,
        } => {
            let workspace = resolve_path(path);
            let config = load_config(&workspace)?;
            let db = open_database(&workspace)?;

            let contents = std::fs::read_to_string(&document)?;
            let document = Document::from_json(&contents)?;
            let viewer = parse_viewer(&viewer)?;

            let registry = ParserRegistry::from_config(&config);
            let policy = MembershipPolicy::from_database(&db)?;
            let coordinator = Coordinator::new(&registry, &db, &policy);
            let outcome = coordinator.resolve(&document, &viewer);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&outcome).unwrap_or_default()
                );
            } else {
                println!(
                    "Resolved {} of {} reference nodes in {}ms",
                    outcome.included_count, outcome.total, outcome.duration_ms
                );
                for reference in &outcome.included {
                    println!("  [{}] {}", reference.node_index, reference.object.describe());
                }
                if !outcome.degraded_kinds.is_empty() {
                    let kinds: Vec<&str> =
                        outcome.degraded_kinds.iter().map(|k| k.as_str()).collect();
                    println!("  (degraded kinds: {})", kinds.join(", "));
                }
            }
        }
        Commands::Status { path, json } => {
            let workspace = resolve_path(path);
            let db = open_database(&workspace)?;
            let stats = db.get_stats()?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&stats).unwrap_or_default()
                );
            } else {
                println!("Reference store status");
                println!("  Projects:       {}", stats.project_count);
                println!("  Issues:         {}", stats.issue_count);
                println!("  Merge requests: {}", stats.merge_request_count);
                println!("  Commits:        {}", stats.commit_count);
                println!("  Labels:         {}", stats.label_count);
                println!("  Users:          {}", stats.user_count);
                println!("  Memberships:    {}", stats.membership_count);
                println!("  DB size:        {} bytes", stats.db_size_bytes);
            }
        }
    }
    Ok(())
}

/// Returns the database path inside a workspace's `.refmark` directory.
fn db_path(workspace: &std::path::Path) -> PathBuf {
    get_refmark_dir(workspace).join("refmark.db")
}

/// Opens the workspace database, requiring `refmark init` to have run.
fn open_database(workspace: &std::path::Path) -> Result<Database> {
    let db_path = db_path(workspace);
    if !db_path.exists() {
        return Err(RefmarkError::Config {
            message: format!(
                "no refmark database found at '{}'; run 'refmark init' first",
                db_path.display()
            ),
        });
    }
    Database::open(&db_path)
}

/// Parses the `--viewer` argument: a numeric user id or "anonymous".
fn parse_viewer(arg: &str) -> Result<Viewer> {
    if arg == "anonymous" {
        return Ok(Viewer::anonymous());
    }
    arg.parse::<i64>()
        .map(Viewer::user)
        .map_err(|_| RefmarkError::Config {
            message: format!("invalid viewer '{}': expected a user id or 'anonymous'", arg),
        })
}

/// Resolves an optional path argument to an absolute `PathBuf`.
///
/// Defaults to the current working directory if no path is provided.
fn resolve_path(path: Option<String>) -> PathBuf {
    match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
