//! palaver CLI: Voice-enabled chat client for the Fin loan assistant

use clap::{Parser, Subcommand};
use palaver_engine::speech::SilentSpeech;
use palaver_engine::{
    chat_endpoint, discover_speech, ChannelSurface, Config, HttpAssistantClient, MarkupMode,
    SessionController, SpeechCapabilities, TurnOutcome, DEFAULT_CONFIG_PATH, REPLY_ERROR_MESSAGE,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Voice-enabled chat client for a conversational loan assistant
#[derive(Parser)]
#[command(name = "palaver")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the chat server base URL
    #[arg(long, global = true)]
    server_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat TUI (default when no command specified)
    Tui,

    /// Send one message to a fresh session and print the reply
    Ask {
        /// The message to send
        message: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the chat endpoint and available speech commands
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    Init,
}

/// Environment variable holding the log filter.
const LOG_ENV: &str = "PALAVER_LOG";

/// Log file used while the TUI owns the terminal.
const TUI_LOG_FILE: &str = "palaver.log";

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Tui) => {
            let _log_guard = init_file_logging(&cli.config);
            let config = load_config(&cli.config, cli.server_url);
            let rt = runtime();
            if let Err(e) = rt.block_on(palaver_tui::run_tui(&config)) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Ask { message, json }) => {
            init_stderr_logging();
            let config = load_config(&cli.config, cli.server_url);
            cmd_ask(&config, &message, json);
        }
        Some(Commands::Doctor { json }) => {
            init_stderr_logging();
            let config = load_config(&cli.config, cli.server_url);
            cmd_doctor(&config, json);
        }
        Some(Commands::Init) => {
            init_stderr_logging();
            cmd_init(&cli.config);
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Log next to the config file so output never lands on the TUI screen.
///
/// Logging is skipped if the directory cannot be created.
fn init_file_logging(config_path: &Path) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).ok()?;

    let appender = tracing_appender::rolling::never(dir, TUI_LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    }
}

fn load_config(path: &Path, server_url: Option<String>) -> Config {
    let mut config = match Config::load_or_default(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", path.display());
            std::process::exit(1);
        }
    };

    if let Some(url) = server_url {
        config.server_url = url;
        if let Err(e) = config.validate() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    config
}

/// Result of `palaver ask`, as printed with `--json`.
#[derive(Serialize)]
struct AskReport {
    ok: bool,
    session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn cmd_ask(config: &Config, message: &str, json: bool) {
    let client = match HttpAssistantClient::new(&config.server_url, config.request_timeout()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // The surface events have no audience here; only the outcome is printed
    let (surface, _events) = ChannelSurface::new();
    let surface = Arc::new(surface);
    let mut controller = SessionController::new(
        Arc::new(client),
        surface.clone(),
        surface,
        Arc::new(SilentSpeech),
    )
    .with_welcome_message(config.welcome_message.clone());

    controller.initialize_session();
    let outcome = runtime().block_on(controller.submit_turn(message));

    let report = match outcome {
        TurnOutcome::Replied(turn) => AskReport {
            ok: true,
            session_id: controller.id().to_string(),
            reply: Some(turn.into_content()),
            error: None,
        },
        TurnOutcome::Failed(e) => AskReport {
            ok: false,
            session_id: controller.id().to_string(),
            reply: None,
            error: Some(e.detail().to_string()),
        },
        TurnOutcome::Ignored => AskReport {
            ok: false,
            session_id: controller.id().to_string(),
            reply: None,
            error: Some("message is empty".into()),
        },
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Failed to serialize report: {e}");
                std::process::exit(1);
            }
        }
    } else if let Some(reply) = &report.reply {
        println!("{}", palaver_engine::markup::present(config.markup, reply));
    } else if let Some(error) = &report.error {
        eprintln!("{REPLY_ERROR_MESSAGE}");
        eprintln!("  {error}");
    }

    if !report.ok {
        std::process::exit(1);
    }
}

/// Result of `palaver doctor`, as printed with `--json`.
#[derive(Serialize)]
struct DoctorReport<'a> {
    endpoint: String,
    request_timeout_seconds: u64,
    markup: MarkupMode,
    speech: &'a SpeechCapabilities,
}

fn cmd_doctor(config: &Config, json: bool) {
    let speech = discover_speech(&config.speech);
    let report = DoctorReport {
        endpoint: chat_endpoint(&config.server_url),
        request_timeout_seconds: config.request_timeout_seconds,
        markup: config.markup,
        speech: &speech,
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Failed to serialize report: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("Chat endpoint: {}", report.endpoint);
    println!("Request timeout: {}s", report.request_timeout_seconds);
    println!("Markup: {:?}\n", report.markup);

    println!("Speech synthesizers\n");
    for engine in &speech.synthesizers {
        let status = if engine.found { "found" } else { "not found" };
        println!("  {} - {status}", engine.name);
        if let Some(path) = &engine.path {
            println!("    Path: {path}");
        }
        for issue in &engine.issues {
            println!("    Issue: {issue}");
        }
    }
    println!();

    match &speech.output_command {
        Some(argv) => println!("Speech output: {}", argv.join(" ")),
        None => println!("Speech output: disabled"),
    }
    match &speech.recognizer {
        Some(engine) if engine.found => println!("Speech input: {}", engine.name),
        Some(engine) => println!("Speech input: {} (not found)", engine.name),
        None => println!("Speech input: not configured"),
    }
}

fn cmd_init(path: &Path) {
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return;
    }

    match Config::default().save(path) {
        Ok(()) => println!("Wrote default config to {}", path.display()),
        Err(e) => {
            eprintln!("Failed to write {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_tui() {
        let cli = Cli::parse_from(["palaver"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_ask_with_global_flags() {
        let cli = Cli::parse_from([
            "palaver",
            "ask",
            "Alice",
            "--json",
            "--server-url",
            "http://localhost:8080",
        ]);
        assert_eq!(cli.server_url.as_deref(), Some("http://localhost:8080"));
        match cli.command {
            Some(Commands::Ask { message, json }) => {
                assert_eq!(message, "Alice");
                assert!(json);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_ask_report_omits_missing_fields() {
        let report = AskReport {
            ok: true,
            session_id: "id".into(),
            reply: Some("Hello Alice".into()),
            error: None,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["reply"], "Hello Alice");
        assert!(value.get("error").is_none());
    }
}
