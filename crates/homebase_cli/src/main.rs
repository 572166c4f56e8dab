//! `homebase` command-line entry point.
//!
//! # Responsibility
//! - Load configuration (defaults, `HOMEBASE_*` environment, flags).
//! - Start logging, open the configured store and run one command.
//!
//! Exit codes: 0 on success, 2 when the intent is rejected or setup fails.

use clap::{Args, Parser, Subcommand};
use homebase_core::{
    core_version, init_logging, open_db, ping, ActionDispatcher, AppConfig, CollectionStore,
    Domain, EscalationGateway, JsonFileCollectionStore, SqliteCollectionStore, StoreBackend,
    UnavailableGateway,
};
use log::info;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_REJECTED: u8 = 2;

#[derive(Parser)]
#[command(name = "homebase", version, about = "Inventory, shopping and todo assistant backend")]
struct Cli {
    /// Directory holding the collections
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Store backend: sqlite or json
    #[arg(long, global = true, value_name = "BACKEND")]
    store: Option<String>,

    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Language model generate endpoint used for escalation
    #[arg(long, global = true, value_name = "URL")]
    llm_endpoint: Option<String>,

    #[arg(long, global = true, value_name = "NAME")]
    llm_model: Option<String>,

    #[arg(long, global = true, value_name = "SECS")]
    llm_timeout_secs: Option<u64>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply one intent and print the resulting message
    Dispatch(DispatchArgs),
    /// Print one collection as JSON
    Show(ShowArgs),
    /// Print core health and version
    Ping,
}

#[derive(Args)]
struct DispatchArgs {
    /// Intent JSON (raw model output is accepted); read from stdin when absent
    #[arg(long, value_name = "JSON")]
    intent: Option<String>,
    /// Original user wording, forwarded on escalation
    #[arg(long, value_name = "TEXT")]
    question: Option<String>,
    /// Never contact the language model
    #[arg(long)]
    offline: bool,
}

#[derive(Args)]
struct ShowArgs {
    /// inventory, shopping or todo
    domain: String,
}

/// Commands that need configuration, logging and an open store.
enum StoreCmd<'a> {
    Dispatch(&'a DispatchArgs),
    Show(&'a ShowArgs),
}

impl Cmd {
    fn store_cmd(&self) -> Option<StoreCmd<'_>> {
        match self {
            Cmd::Dispatch(args) => Some(StoreCmd::Dispatch(args)),
            Cmd::Show(args) => Some(StoreCmd::Show(args)),
            Cmd::Ping => None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(EXIT_REJECTED)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, String> {
    let Some(cmd) = cli.cmd.store_cmd() else {
        println!("homebase_core ping={}", ping());
        println!("homebase_core version={}", core_version());
        return Ok(ExitCode::SUCCESS);
    };

    let config = load_config(&cli)?;
    let log_dir = config.resolved_log_dir().map_err(|err| err.to_string())?;
    init_logging(&config.log_level, &log_dir)?;
    info!(
        "event=cli_start module=cli status=ok store={} data_dir={}",
        config.store_backend.as_str(),
        config.data_dir.display()
    );

    match config.store_backend {
        StoreBackend::Sqlite => {
            std::fs::create_dir_all(&config.data_dir).map_err(|err| {
                format!("cannot create `{}`: {err}", config.data_dir.display())
            })?;
            let conn = open_db(config.sqlite_path()).map_err(|err| err.to_string())?;
            let store = SqliteCollectionStore::try_new(&conn).map_err(|err| err.to_string())?;
            execute(cmd, &config, store)
        }
        StoreBackend::Json => execute(
            cmd,
            &config,
            JsonFileCollectionStore::new(&config.data_dir),
        ),
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, String> {
    let mut config = AppConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(store) = &cli.store {
        config.store_backend = StoreBackend::parse(store).map_err(|err| err.to_string())?;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    if let Some(endpoint) = &cli.llm_endpoint {
        config.gateway.endpoint = endpoint.clone();
    }
    if let Some(model) = &cli.llm_model {
        config.gateway.model = model.clone();
    }
    if let Some(secs) = cli.llm_timeout_secs {
        config.gateway.timeout_secs = secs;
    }
    config.validate().map_err(|err| err.to_string())?;
    Ok(config)
}

fn execute<S: CollectionStore>(cmd: StoreCmd<'_>, config: &AppConfig, store: S) -> Result<ExitCode, String> {
    match cmd {
        StoreCmd::Show(ShowArgs { domain }) => {
            let domain = Domain::parse(domain)
                .ok_or_else(|| format!("unknown collection `{domain}`; expected inventory|shopping|todo"))?;
            let snapshot = store
                .read(domain)
                .and_then(|document| document.to_json_value())
                .map_err(|err| err.to_string())?;
            let rendered = serde_json::to_string_pretty(&snapshot).map_err(|err| err.to_string())?;
            println!("{rendered}");
            Ok(ExitCode::SUCCESS)
        }
        StoreCmd::Dispatch(DispatchArgs {
            intent,
            question,
            offline,
        }) => {
            let raw = match intent {
                Some(text) => text.clone(),
                None => read_stdin()?,
            };
            let question = question.clone().unwrap_or_else(|| raw.trim().to_string());
            let dispatcher = ActionDispatcher::new(store, build_gateway(config, *offline)?);

            match dispatcher.dispatch_json(&raw, &question) {
                Ok(outcome) => {
                    println!("{}", outcome.message());
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("{err}");
                    Ok(ExitCode::from(EXIT_REJECTED))
                }
            }
        }
    }
}

fn read_stdin() -> Result<String, String> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .map_err(|err| format!("failed to read intent from stdin: {err}"))?;
    Ok(raw)
}

fn build_gateway(config: &AppConfig, offline: bool) -> Result<Box<dyn EscalationGateway>, String> {
    if offline {
        return Ok(Box::new(UnavailableGateway));
    }
    #[cfg(feature = "ollama")]
    {
        let gateway =
            homebase_core::OllamaGateway::new(&config.gateway).map_err(|err| err.to_string())?;
        Ok(Box::new(gateway))
    }
    #[cfg(not(feature = "ollama"))]
    {
        let _ = config;
        Ok(Box::new(UnavailableGateway))
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, StoreCmd};
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("homebase").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn ping_needs_no_store() {
        assert!(parse(&["ping"]).cmd.store_cmd().is_none());
        assert!(parse(&["--store", "bogus", "ping"]).cmd.store_cmd().is_none());
    }

    #[test]
    fn store_commands_carry_their_arguments() {
        let cli = parse(&["show", "todo"]);
        assert!(matches!(cli.cmd.store_cmd(), Some(StoreCmd::Show(args)) if args.domain == "todo"));

        let cli = parse(&["dispatch", "--offline", "--intent", "{}"]);
        match cli.cmd.store_cmd() {
            Some(StoreCmd::Dispatch(args)) => {
                assert!(args.offline);
                assert_eq!(args.intent.as_deref(), Some("{}"));
                assert!(args.question.is_none());
            }
            _ => panic!("dispatch should need a store"),
        }
    }
}
