use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use configs::{AppConfig, LogFormat};
use migration::MigratorTrait;
use serde::Serialize;
use service::{CustomerDirectory, SeaOrmGateway};
use tracing::{error, info};

const USAGE: &str = "usage: lunchly <migrate | list | search <text> | top | show <id> | reservation <id>>";

enum Command {
    Migrate,
    List,
    Search(String),
    Top,
    Show(i32),
    Reservation(i32),
}

fn parse_id(raw: &str, what: &str) -> anyhow::Result<i32> {
    raw.parse().with_context(|| format!("{what} id must be an integer, got {raw:?}"))
}

impl Command {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        match args {
            [cmd] if cmd == "migrate" => Ok(Command::Migrate),
            [cmd] if cmd == "list" => Ok(Command::List),
            [cmd] if cmd == "top" => Ok(Command::Top),
            [cmd, rest @ ..] if cmd == "search" && !rest.is_empty() => Ok(Command::Search(rest.join(" "))),
            [cmd, id] if cmd == "show" => Ok(Command::Show(parse_id(id, "customer")?)),
            [cmd, id] if cmd == "reservation" => Ok(Command::Reservation(parse_id(id, "reservation")?)),
            _ => Err(anyhow!(USAGE)),
        }
    }
}

/// Logs go to stderr; stdout carries only command output.
fn init_logging(cfg: &AppConfig) {
    let filter = cfg.logging.filter.as_deref();
    match cfg.logging.format {
        LogFormat::Compact => {
            common::utils::logging::init_logging_default(filter, io::stderr, io::stderr().is_terminal())
        }
        LogFormat::Json => common::utils::logging::init_logging_json(filter, io::stderr),
    }
    info!(service = "lunchly", event = "logger_init", "tracing subscriber initialized");
}

fn write_json<W: Write, T: Serialize>(mut out: W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> { write_json(io::stdout().lock(), value) }

async fn run(cfg: AppConfig, command: Command) -> anyhow::Result<()> {
    let db = models::db::connect_with_config(&cfg.database).await?;

    if let Command::Migrate = command {
        migration::Migrator::up(&db, None).await?;
        info!(service = "lunchly", event = "migrated", "database schema is up to date");
        return Ok(());
    }

    let gateway = Arc::new(SeaOrmGateway::new(db));
    let directory = CustomerDirectory::with_top_limit(gateway, cfg.directory.top_customers);
    match command {
        Command::List => print_json(&directory.list().await?),
        Command::Search(text) => print_json(&directory.search(&text).await?),
        Command::Top => print_json(&directory.best_customers().await?),
        Command::Show(id) => print_json(&directory.detail(id).await?),
        Command::Reservation(id) => print_json(&directory.reservation_detail(id).await?),
        Command::Migrate => Ok(()),
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let cfg = match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("invalid configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&cfg);

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "lunchly", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cfg, command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(service = "lunchly", event = "command_failed", error = %format!("{e:#}"), "command failed");
            ExitCode::FAILURE
        }
    }
}
