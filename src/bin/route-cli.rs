//! Management CLI for the Route store.
//!
//! Every command prints pretty JSON on stdout; logs go to stderr.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};

use route_tree::config::{load_or_default, AppConfig};
use route_tree::kinds::{RouteKind, ROUTE_TYPES};
use route_tree::lifecycle::startup;
use route_tree::observability::logging;
use route_tree::{check_route_types, Route, Routes};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Manage the Routes of a route-tree database", long_about = None)]
struct Cli {
    /// TOML configuration file; supplies the database and url policy.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database file, overriding the configuration.
    #[arg(short, long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the tables, and optionally a root Route
    Init {
        #[arg(long)]
        root: bool,
    },
    /// Create a Route
    Create {
        #[arg(long)]
        url: String,
        #[command(flatten)]
        kind: KindArgs,
        /// Use 301 instead of 302 for --redirect
        #[arg(long, requires = "redirect")]
        permanent: bool,
    },
    /// List every Route ordered by url
    List,
    /// Show which Route serves a path
    Resolve { path: String },
    /// Move a Route, optionally with its descendants
    Move {
        url: String,
        new_url: String,
        #[arg(long)]
        children: bool,
    },
    /// Swap the urls of two Routes
    Swap {
        url_a: String,
        url_b: String,
        #[arg(long)]
        children: bool,
    },
    /// Delete a Route; refuses when it has descendants unless --cascade
    Delete {
        url: String,
        #[arg(long)]
        cascade: bool,
    },
    /// Run the Route type checks
    Check,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct KindArgs {
    /// Page content
    #[arg(long)]
    page: Option<String>,
    /// Redirect target
    #[arg(long)]
    redirect: Option<String>,
    /// Section title
    #[arg(long)]
    section: Option<String>,
    /// A bare Route
    #[arg(long)]
    plain: bool,
}

impl KindArgs {
    fn into_kind(self, permanent: bool) -> RouteKind {
        if let Some(content) = self.page {
            RouteKind::Page { content }
        } else if let Some(target) = self.redirect {
            RouteKind::Redirect {
                target,
                permanent,
            }
        } else if let Some(title) = self.section {
            RouteKind::Section { title }
        } else {
            RouteKind::Plain
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database.path = database;
    }
    logging::init_cli_logging(&config.observability.log_level);

    let output = run(cli.command, &config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn run(command: Commands, config: &AppConfig) -> CliResult<Value> {
    let open = || startup::open_routes(config);
    let output = match command {
        Commands::Check => {
            let issues = check_route_types(&ROUTE_TYPES);
            json!({ "ok": issues.is_empty(), "issues": issues })
        }
        Commands::Init { root } => {
            let routes = open()?;
            if root && routes.get_by_url("/").is_err() {
                routes.create("/", RouteKind::Plain)?;
            }
            json!({ "database": config.database.path, "routes": routes.all()?.len() })
        }
        Commands::Create {
            url,
            kind,
            permanent,
        } => json!(open()?.create(&url, kind.into_kind(permanent))?),
        Commands::List => json!(open()?.all()?),
        Commands::Resolve { path } => {
            let route = open()?.best_match_for_path(&path)?;
            let remaining = route.remaining_path(&path).unwrap_or("/").to_string();
            json!({ "route": route, "remaining_path": remaining })
        }
        Commands::Move {
            url,
            new_url,
            children,
        } => {
            let routes = open()?;
            let mut route = routes.get_by_url(&url)?;
            routes.move_to(&mut route, &new_url, children)?;
            json!(route)
        }
        Commands::Swap {
            url_a,
            url_b,
            children,
        } => {
            let routes = open()?;
            let mut a = routes.get_by_url(&url_a)?;
            let mut b = routes.get_by_url(&url_b)?;
            routes.swap_with(&mut a, &mut b, children)?;
            json!([a, b])
        }
        Commands::Delete { url, cascade } => delete(&open()?, &url, cascade)?,
    };
    Ok(output)
}

fn delete(routes: &Routes, url: &str, cascade: bool) -> CliResult<Value> {
    let mut route: Route = routes.get_by_url(url)?;
    if cascade {
        let deleted = routes.delete_subtree(&mut route)?;
        return Ok(json!({ "deleted": deleted }));
    }
    let descendants = routes.get_descendants(&route)?;
    if let Some(first) = descendants.first() {
        return Err(format!(
            "{} has {} descendant(s), starting with {}; pass --cascade to delete them too",
            route,
            descendants.len(),
            first.url()
        )
        .into());
    }
    routes.delete(&mut route)?;
    Ok(json!({ "deleted": 1 }))
}
