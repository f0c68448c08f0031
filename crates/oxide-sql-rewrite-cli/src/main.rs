//! sqlrw CLI
//!
//! Command-line front end for SQL analysis and rewriting.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_sql_rewrite::{
    clean_and_format_sql, clean_sql, contains_comments, remove_comments_only, RewriteConfig,
    SqlRewriter,
};

/// SQL analysis and JOIN/WHERE injection.
#[derive(Parser)]
#[command(name = "sqlrw")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with a rewrite configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum nesting of subqueries and parentheses.
    #[arg(long, env = "SQLRW_MAX_DEPTH")]
    max_depth: Option<usize>,

    /// Maximum number of operands in one operator chain.
    #[arg(long, env = "SQLRW_MAX_TERMS")]
    max_terms: Option<usize>,

    /// Reject condition segments that cannot be modeled instead of dropping them.
    #[arg(long, env = "SQLRW_STRICT")]
    strict: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Strip comments and collapse whitespace.
    Clean {
        /// SQL text (read from stdin if omitted).
        sql: Option<String>,

        /// Only remove comments, keeping line structure.
        #[arg(long)]
        keep_lines: bool,
    },

    /// Clean and put every top-level clause on its own line.
    Format {
        /// SQL text (read from stdin if omitted).
        sql: Option<String>,
    },

    /// Parse a statement and print it in canonical form.
    Parse {
        /// SQL text (read from stdin if omitted).
        sql: Option<String>,
    },

    /// List the tables a statement references.
    Tables {
        /// SQL text (read from stdin if omitted).
        sql: Option<String>,

        /// Include tables inside subqueries and CTEs.
        #[arg(short, long)]
        deep: bool,

        /// Leave out derived tables.
        #[arg(long)]
        named_only: bool,
    },

    /// List the `?` placeholders in binding order.
    Params {
        /// SQL text (read from stdin if omitted).
        sql: Option<String>,
    },

    /// List placeholders with their owning columns resolved to tables.
    Mappings {
        /// SQL text (read from stdin if omitted).
        sql: Option<String>,
    },

    /// Add a JOIN and/or WHERE fragment to a statement.
    Merge {
        /// SQL text (read from stdin if omitted).
        sql: Option<String>,

        /// JOIN fragment, e.g. "LEFT JOIN orders o ON o.user_id = u.id".
        #[arg(short, long = "join")]
        join: Option<String>,

        /// WHERE fragment, e.g. "tenant_id = ?".
        #[arg(short, long = "where")]
        where_: Option<String>,
    },
}

/// The SQL argument, or all of stdin when it is absent.
fn sql_input(arg: Option<String>) -> anyhow::Result<String> {
    if let Some(sql) = arg {
        return Ok(sql);
    }
    let mut sql = String::new();
    std::io::stdin()
        .read_to_string(&mut sql)
        .context("reading SQL from stdin")?;
    Ok(sql)
}

fn load_config(cli: &Cli) -> anyhow::Result<RewriteConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => RewriteConfig::default(),
    };
    if let Some(max_depth) = cli.max_depth {
        config = config.with_max_depth(max_depth);
    }
    if let Some(max_terms) = cli.max_terms {
        config = config.with_max_terms(max_terms);
    }
    if cli.strict {
        config = config.with_strict_conditions(true);
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli)?;
    debug!(?config, "configuration");
    let rewriter = SqlRewriter::new(config);

    match cli.command {
        Commands::Clean { sql, keep_lines } => {
            let sql = sql_input(sql)?;
            if keep_lines {
                print!("{}", remove_comments_only(&sql));
            } else {
                println!("{}", clean_sql(&sql));
            }
        }

        Commands::Format { sql } => {
            let sql = sql_input(sql)?;
            if contains_comments(&sql) {
                debug!("comments removed before formatting");
            }
            println!("{}", clean_and_format_sql(&sql));
        }

        Commands::Parse { sql } => {
            let stmt = rewriter.parse(&sql_input(sql)?)?;
            println!("{stmt}");
        }

        Commands::Tables {
            sql,
            deep,
            named_only,
        } => {
            let sql = sql_input(sql)?;
            let tables = if named_only {
                rewriter.named_tables(&sql, deep)?
            } else {
                rewriter.tables(&sql, deep)?
            };
            println!("{}", serde_json::to_string_pretty(&tables)?);
        }

        Commands::Params { sql } => {
            let params = rewriter.parameters(&sql_input(sql)?)?;
            println!("{}", serde_json::to_string_pretty(&params)?);
        }

        Commands::Mappings { sql } => {
            let mappings = rewriter.parameter_mappings(&sql_input(sql)?)?;
            println!("{}", serde_json::to_string_pretty(&mappings)?);
        }

        Commands::Merge { sql, join, where_ } => {
            if join.is_none() && where_.is_none() {
                anyhow::bail!("nothing to merge: pass --join and/or --where");
            }
            let sql = sql_input(sql)?;
            let merged = rewriter.add_join_and_where(&sql, join.as_deref(), where_.as_deref())?;
            let params = rewriter.parameters(&merged)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "sql": merged,
                    "parameters": params.len(),
                }))?
            );
        }
    }

    Ok(())
}
