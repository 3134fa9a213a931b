use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sqlite_admin_core::{ColumnDescriptor, ColumnType, IdentifiedRow, Value};
use sqlite_admin_db::{Registry, RegistryConfig};
use sqlite_admin_sqlite::Database;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "sqlite-admin")]
#[command(about = "Browse and edit SQLite databases", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// YAML registry configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Database file to administer; repeat for several.
    #[arg(long = "db", global = true)]
    databases: Vec<PathBuf>,
    /// Output format.
    #[arg(long, global = true, default_value = "table")]
    format: OutputFormat,
    /// Log every statement to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List registered databases with their tables and row counts.
    Databases,
    /// List the tables of one database.
    Tables(DatabaseArgs),
    /// Show the columns and primary key of a table.
    Columns(TableArgs),
    /// Print the CREATE TABLE statement of a table.
    Schema(TableArgs),
    /// List rows of a table together with their identities.
    Rows(RowsArgs),
    /// Show the single row addressed by an identity.
    Row(RowArgs),
    /// Show file information for one database.
    Info(DatabaseArgs),
    /// Create a table holding only an integer `id` key.
    CreateTable(TableArgs),
    /// Add a column to a table.
    AddColumn(AddColumnArgs),
    /// Insert one row.
    Insert(InsertArgs),
}

#[derive(Debug, Args)]
struct DatabaseArgs {
    /// Logical database name (the file stem).
    database: String,
}

#[derive(Debug, Args)]
struct TableArgs {
    /// Logical database name (the file stem).
    database: String,
    /// Table name.
    table: String,
}

#[derive(Debug, Args)]
struct RowsArgs {
    #[command(flatten)]
    target: TableArgs,
    /// Maximum rows to return (default: the configured row limit).
    #[arg(long)]
    limit: Option<u64>,
}

#[derive(Debug, Args)]
struct RowArgs {
    #[command(flatten)]
    target: TableArgs,
    /// Row identity as printed by `rows`.
    identity: String,
}

#[derive(Debug, Args)]
struct AddColumnArgs {
    #[command(flatten)]
    target: TableArgs,
    /// New column name.
    column: String,
    /// Column type: VARCHAR, TEXT, INTEGER, REAL, BOOL, BLOB, DATETIME, DATE, TIME or DECIMAL.
    #[arg(value_name = "TYPE")]
    column_type: ColumnType,
}

#[derive(Debug, Args)]
struct InsertArgs {
    #[command(flatten)]
    target: TableArgs,
    /// Column values as `name=value`, in column-list order.
    #[arg(value_name = "NAME=VALUE", required = true)]
    values: Vec<String>,
    /// Parse each value as JSON so numbers, booleans and null keep their type.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ColumnsOutput<'a> {
    columns: &'a [ColumnDescriptor],
    primary_key: &'a [String],
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let registry = open_registry(&cli.global)?;
    let format = cli.global.format;

    match cli.command {
        Command::Databases => run_databases(&registry, format).await,
        Command::Tables(args) => run_tables(&registry, args, format).await,
        Command::Columns(args) => run_columns(&registry, args, format).await,
        Command::Schema(args) => run_schema(&registry, args).await,
        Command::Rows(args) => run_rows(&registry, args, format).await,
        Command::Row(args) => run_row(&registry, args, format).await,
        Command::Info(args) => run_info(&registry, args, format).await,
        Command::CreateTable(args) => run_create_table(&registry, args).await,
        Command::AddColumn(args) => run_add_column(&registry, args).await,
        Command::Insert(args) => run_insert(&registry, args).await,
    }
}

/// Builds the registry from `--config` plus any `--db` paths.
fn open_registry(args: &GlobalArgs) -> anyhow::Result<Registry> {
    let mut config = match &args.config {
        Some(path) => RegistryConfig::load(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => RegistryConfig::default(),
    };
    config.merge_paths(args.databases.iter().cloned());

    if config.databases.is_empty() {
        bail!("no databases given; pass --db <PATH> or --config <FILE>");
    }
    debug!(databases = config.databases.len(), row_limit = config.row_limit, "opening registry");
    Registry::from_config(&config).context("failed to open databases")
}

fn database<'r>(registry: &'r Registry, name: &str) -> anyhow::Result<&'r Database> {
    Ok(registry.get(name)?)
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

async fn run_databases(registry: &Registry, format: OutputFormat) -> anyhow::Result<()> {
    let summaries = registry.summaries().await?;
    if format == OutputFormat::Json {
        return print_json(&summaries);
    }

    let rows = summaries
        .iter()
        .flat_map(|summary| {
            if summary.tables.is_empty() {
                vec![vec![summary.name.clone(), String::new(), String::new()]]
            } else {
                summary
                    .tables
                    .iter()
                    .map(|table| {
                        vec![
                            summary.name.clone(),
                            table.name.clone(),
                            table.row_count.to_string(),
                        ]
                    })
                    .collect()
            }
        })
        .collect::<Vec<_>>();
    print_table(&["database", "table", "rows"], &rows);
    Ok(())
}

async fn run_tables(registry: &Registry, args: DatabaseArgs, format: OutputFormat) -> anyhow::Result<()> {
    let overview = database(registry, &args.database)?.overview().await?;
    if format == OutputFormat::Json {
        return print_json(&overview);
    }

    let rows = overview
        .iter()
        .map(|entry| {
            vec![
                entry.table.name.clone(),
                entry.table.row_count.to_string(),
                entry.table.column_count.to_string(),
                entry.primary_key.join(","),
            ]
        })
        .collect::<Vec<_>>();
    print_table(&["table", "rows", "columns", "key"], &rows);
    Ok(())
}

async fn run_columns(registry: &Registry, args: TableArgs, format: OutputFormat) -> anyhow::Result<()> {
    let db = database(registry, &args.database)?;
    let columns = db.columns(&args.table).await?;
    let primary_key = db.primary_key(&args.table).await?;
    if format == OutputFormat::Json {
        return print_json(&ColumnsOutput {
            columns: &columns,
            primary_key: &primary_key,
        });
    }

    let rows = columns
        .iter()
        .map(|column| {
            vec![
                column.name.clone(),
                column.column_type.clone(),
                if column.nullable { "yes" } else { "no" }.to_string(),
                column.default_value.clone().unwrap_or_default(),
                match column.primary_key_ordinal {
                    0 => String::new(),
                    ordinal => ordinal.to_string(),
                },
            ]
        })
        .collect::<Vec<_>>();
    print_table(&["column", "type", "nullable", "default", "key"], &rows);
    if primary_key.is_empty() {
        println!("\nRows are addressed by rowid.");
    } else {
        println!("\nIdentity order: {}", primary_key.join(", "));
    }
    Ok(())
}

async fn run_schema(registry: &Registry, args: TableArgs) -> anyhow::Result<()> {
    let sql = database(registry, &args.database)?.schema_sql(&args.table).await?;
    println!("{sql}");
    Ok(())
}

async fn run_rows(registry: &Registry, args: RowsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let limit = args.limit.unwrap_or(registry.row_limit());
    let rows = database(registry, &args.target.database)?
        .rows(&args.target.table, limit)
        .await?;
    if format == OutputFormat::Json {
        return print_json(&rows);
    }
    print_rows(&rows);
    Ok(())
}

async fn run_row(registry: &Registry, args: RowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let row = database(registry, &args.target.database)?
        .row(&args.target.table, &args.identity)
        .await?;
    let Some(row) = row else {
        bail!(
            "no row with identity '{}' in table '{}'",
            args.identity,
            args.target.table
        );
    };
    if format == OutputFormat::Json {
        return print_json(&row);
    }

    let fields = row
        .row
        .iter()
        .map(|(column, value)| vec![column.to_string(), value.to_string()])
        .collect::<Vec<_>>();
    print_table(&["column", "value"], &fields);
    Ok(())
}

async fn run_info(registry: &Registry, args: DatabaseArgs, format: OutputFormat) -> anyhow::Result<()> {
    let info = database(registry, &args.database)?.info().await?;
    if format == OutputFormat::Json {
        return print_json(&info);
    }

    let created = info.created_at.map(|t| t.to_rfc3339()).unwrap_or_default();
    let modified = info.updated_at.map(|t| t.to_rfc3339()).unwrap_or_default();
    println!("File: {}", info.filename);
    println!("  Path: {}", info.filepath);
    println!("  Size: {} ({} bytes)", info.filesize, info.size_bytes);
    println!("  Created: {created}");
    println!("  Modified: {modified}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

async fn run_create_table(registry: &Registry, args: TableArgs) -> anyhow::Result<()> {
    database(registry, &args.database)?
        .create_table(&args.table)
        .await
        .with_context(|| format!("failed to create table '{}'", args.table))?;
    println!("Created table '{}' in '{}'.", args.table, args.database);
    Ok(())
}

async fn run_add_column(registry: &Registry, args: AddColumnArgs) -> anyhow::Result<()> {
    let AddColumnArgs {
        target,
        column,
        column_type,
    } = args;
    database(registry, &target.database)?
        .add_column(&target.table, &column, column_type)
        .await
        .with_context(|| format!("failed to add column '{column}' to '{}'", target.table))?;
    println!("Added {column_type} column '{column}' to '{}'.", target.table);
    Ok(())
}

async fn run_insert(registry: &Registry, args: InsertArgs) -> anyhow::Result<()> {
    let values = args
        .values
        .iter()
        .map(|pair| parse_assignment(pair, args.json))
        .collect::<anyhow::Result<Vec<_>>>()?;
    database(registry, &args.target.database)?
        .insert_row(&args.target.table, values)
        .await
        .with_context(|| format!("failed to insert into '{}'", args.target.table))?;
    println!("Inserted 1 row into '{}'.", args.target.table);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Splits `name=value` at the first `=`.
///
/// With `json`, the value is parsed as JSON so `30`, `true` and `null`
/// bind as integer, integer and NULL; otherwise it binds as text.
fn parse_assignment(pair: &str, json: bool) -> anyhow::Result<(String, Value)> {
    let Some((column, raw)) = pair.split_once('=') else {
        bail!("expected NAME=VALUE, got '{pair}'");
    };
    if column.is_empty() {
        bail!("missing column name in '{pair}'");
    }
    let value = if json {
        let parsed: serde_json::Value = serde_json::from_str(raw)
            .with_context(|| format!("value for '{column}' is not valid JSON: {raw}"))?;
        Value::from(parsed)
    } else {
        Value::from(raw)
    };
    Ok((column.to_string(), value))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Prints identified rows with the identity as the first column.
fn print_rows(rows: &[IdentifiedRow]) {
    let Some(first) = rows.first() else {
        println!("(no rows)");
        return;
    };
    let mut headers = vec!["identity"];
    headers.extend(first.row.columns.iter().map(String::as_str));

    let cells = rows
        .iter()
        .map(|identified| {
            std::iter::once(identified.identity.clone())
                .chain(identified.row.values.iter().map(Value::to_string))
                .collect()
        })
        .collect::<Vec<_>>();
    print_table(&headers, &cells);
}

/// Prints left-aligned columns separated by two spaces.
fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    println!("{}", render_line(headers.iter().copied(), &widths));
    for row in rows {
        println!("{}", render_line(row.iter().map(String::as_str), &widths));
    }
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment_text() {
        assert_eq!(
            parse_assignment("name=Ann", false).unwrap(),
            ("name".to_string(), Value::from("Ann"))
        );
        assert_eq!(
            parse_assignment("expr=a=b", false).unwrap(),
            ("expr".to_string(), Value::from("a=b"))
        );
        assert_eq!(
            parse_assignment("empty=", false).unwrap(),
            ("empty".to_string(), Value::from(""))
        );
    }

    #[test]
    fn test_parse_assignment_json() {
        assert_eq!(parse_assignment("age=30", true).unwrap().1, Value::Integer(30));
        assert_eq!(parse_assignment("ratio=0.5", true).unwrap().1, Value::Real(0.5));
        assert_eq!(parse_assignment("gone=null", true).unwrap().1, Value::Null);
        assert_eq!(parse_assignment("name=\"Ann\"", true).unwrap().1, Value::from("Ann"));
        assert!(parse_assignment("name=Ann", true).is_err());
    }

    #[test]
    fn test_parse_assignment_rejects_malformed() {
        assert!(parse_assignment("no-equals-sign", false).is_err());
        assert!(parse_assignment("=value", false).is_err());
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sqlite-admin",
            "rows",
            "app",
            "users",
            "--limit",
            "5",
            "--db",
            "app.db",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.global.databases, vec![PathBuf::from("app.db")]);
        assert_eq!(cli.global.format, OutputFormat::Json);
        match cli.command {
            Command::Rows(args) => {
                assert_eq!(args.target.table, "users");
                assert_eq!(args.limit, Some(5));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_column_type_case_insensitively() {
        let cli = Cli::try_parse_from([
            "sqlite-admin", "add-column", "app", "users", "email", "varchar",
        ])
        .unwrap();
        match cli.command {
            Command::AddColumn(args) => assert_eq!(args.column_type, ColumnType::Varchar),
            other => panic!("unexpected command {other:?}"),
        }
        assert!(
            Cli::try_parse_from(["sqlite-admin", "add-column", "app", "users", "email", "jsonb"])
                .is_err()
        );
    }
}
