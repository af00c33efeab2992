use std::env;
use std::io::{self, Write};
use std::process;
use std::sync::Arc;

use search_domain::catalog::{register_people, NOTABLE, NOTE, PERSON};
use search_domain::service::SearchService;
use search_domain::{AttributeRegistry, OwnerRef, SearchParams, Value};
use sqlite_adapter::SqliteEngine;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

fn print_usage() {
    eprintln!(
        "{}\n\nUsage:\n  search-cli attributes\n  search-cli search [<attr>_<op>=<value>...] [--sort \"<attr> [asc|desc]\"] [--limit <n>] [--offset <n>]\n  search-cli notes <owner_kind> <owner_id> [<attr>_<op>=<value>...]\n\nNotes:\n  - DB_PATH must point at a SQLite database with `people`, `articles`, `comments`, `tags` and `notes` tables.\n  - Values for `_in` / `_not_in` keys are comma separated.\n  - Rows are printed as JSON lines.",
        search_domain::about()
    );
}

#[derive(Debug, PartialEq)]
enum Command {
    Attributes,
    Search(SearchParams),
    Notes(OwnerRef, SearchParams),
}

/// Parse a `key=value` condition. List operators split the value on commas.
fn parse_condition(arg: &str) -> Result<(String, Value), String> {
    let Some((key, raw)) = arg.split_once('=') else {
        return Err(format!("expected <attr>_<op>=<value>, got '{}'", arg));
    };
    let value = if key.ends_with("_in") {
        Value::List(raw.split(',').map(|s| Value::text(s.trim())).collect())
    } else {
        Value::text(raw)
    };
    Ok((key.to_string(), value))
}

fn parse_params(rest: &[String], default_limit: usize) -> Result<SearchParams, String> {
    let mut params = SearchParams::new().limit(default_limit);
    let mut i = 0;
    while i < rest.len() {
        match rest[i].as_str() {
            flag @ ("--sort" | "--limit" | "--offset") => {
                let Some(val) = rest.get(i + 1) else {
                    return Err(format!("{} requires a value", flag));
                };
                match flag {
                    "--sort" => params = params.sort(val.as_str()),
                    "--limit" => {
                        let n = val.parse().map_err(|_| "--limit must be a number".to_string())?;
                        params = params.limit(n);
                    }
                    _ => {
                        let n = val.parse().map_err(|_| "--offset must be a number".to_string())?;
                        params = params.offset(n);
                    }
                }
                i += 2;
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown argument: {}", other));
            }
            cond => {
                let (key, value) = parse_condition(cond)?;
                params = params.condition(key, value);
                i += 1;
            }
        }
    }
    Ok(params)
}

fn parse_command(args: &[String], default_limit: usize) -> Result<Option<Command>, String> {
    let Some(cmd) = args.first() else {
        return Ok(None);
    };
    match cmd.as_str() {
        "attributes" => Ok(Some(Command::Attributes)),
        "search" => Ok(Some(Command::Search(parse_params(&args[1..], default_limit)?))),
        "notes" => {
            let (Some(kind), Some(id)) = (args.get(1), args.get(2)) else {
                return Err("notes requires <owner_kind> <owner_id>".into());
            };
            let id: i64 = id.parse().map_err(|_| format!("invalid owner id '{}'", id))?;
            let params = parse_params(&args[3..], default_limit)?;
            Ok(Some(Command::Notes(OwnerRef::new(kind.as_str(), id), params)))
        }
        _ => Ok(None),
    }
}

fn execute<W: Write>(
    svc: &SearchService<SqliteEngine>,
    cmd: Command,
    out: &mut W,
) -> Result<(), String> {
    let rows = match cmd {
        Command::Attributes => {
            let registry = svc.registry();
            for entity in registry.entities() {
                let search = registry
                    .searchable_attributes(entity.name())
                    .map_err(|e| e.to_string())?;
                let sort = registry
                    .sortable_attributes(entity.name())
                    .map_err(|e| e.to_string())?;
                for (name, _) in entity.attributes() {
                    let mode = match (search.contains(name), sort.contains(name)) {
                        (true, true) => "search,sort",
                        (true, false) => "search",
                        (false, true) => "sort",
                        (false, false) => "-",
                    };
                    writeln!(out, "{}.{}\t{}", entity.name(), name, mode)
                        .map_err(|e| e.to_string())?;
                }
            }
            return Ok(());
        }
        Command::Search(params) => svc.search(PERSON, &params),
        Command::Notes(owner, params) => svc.search_owned(NOTE, NOTABLE, &owner, &params),
    }
    .map_err(|e| format!("search failed: {}", e))?;

    info!(rows = rows.len(), "search ok");
    for row in rows {
        let line = serde_json::to_string(&row).map_err(|e| e.to_string())?;
        writeln!(out, "{}", line).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn build_service(cfg: &config::Config) -> Result<SearchService<SqliteEngine>, String> {
    let engine = SqliteEngine::new(&cfg.db_path).map_err(|e| e.to_string())?;
    let mut registry = AttributeRegistry::new();
    register_people(&mut registry, &engine).map_err(|e| format!("registry setup failed: {}", e))?;
    Ok(SearchService::new(Arc::new(registry), engine))
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || matches!(args[0].as_str(), "-h" | "--help" | "help") {
        print_usage();
        return Ok(());
    }

    // Load and validate config first (fail fast on misconfiguration)
    let cfg = config::Config::from_env().map_err(|e| e.to_string())?;
    init_tracing(&cfg);
    cfg.warn_if_missing_db();

    let Some(cmd) = parse_command(&args, cfg.search_limit)? else {
        print_usage();
        return Ok(());
    };
    let svc = build_service(&cfg)?;
    let stdout = io::stdout();
    execute(&svc, cmd, &mut stdout.lock())
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Logs go to stderr; stdout carries the result rows.
    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(io::stderr),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(fmt::layer().with_target(true).with_writer(io::stderr))
                .init();
        }
    }
}

fn main() {
    if let Err(msg) = run() {
        error!(err = %msg, "search-cli failed");
        eprintln!("error: {}", msg);
        process::exit(1);
    }
}
