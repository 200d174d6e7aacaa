//! Command-line interface parsing and handling
//!
//! Parses arguments, loads `.env` and config, sets up tracing, and hands a
//! fully built conversation driver to the chat loop.

pub mod chat_loop;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::chat_loop::{print_personas, run_chat};
use crate::core::chat_stream::GeminiService;
use crate::core::config::io::{resolve_api_key, resolve_base_url};
use crate::core::config::Config;
use crate::core::conversation::ConversationDriver;
use crate::core::persona::PersonaRegistry;
use crate::core::selection::PersistedSelection;
use crate::core::session::SessionState;
use crate::utils::logging::LogStore;

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "PARLEY_LOG";

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "parley")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A terminal chat client for Gemini with per-persona conversation logs")]
#[command(
    long_about = "Parley is a line-oriented chat client for Google's Gemini API. Each persona \
has its own system instruction and its own Markdown conversation log, and the \
last persona you used is restored on the next start.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    Your Google AI Studio API key (required, may live in .env)\n\
  GEMINI_BASE_URL   Custom API base URL (optional)\n\
  PARLEY_LOG        Tracing filter, e.g. 'parley=debug' (optional)\n\n\
Commands inside the chat:\n\
  quit, exit, bye   Save the current persona and leave\n\
  clear             Forget in-memory history (the log file is kept)\n\
  prompt:<name>     Switch persona\n\
  prompt:list       List personas"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Persona to switch to right after startup
    #[arg(short = 'p', long, global = true, value_name = "NAME")]
    pub persona: Option<String>,

    /// Gemini model to use (overrides config)
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Directory for conversation logs and the last-persona file
    #[arg(short = 'd', long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file to read instead of the per-user default
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// List available personas and exit
    Personas,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    // A missing .env is normal; the key may come from the real environment.
    let _ = dotenvy::dotenv();
    init_tracing();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("❌ Error: {err}");
            std::process::exit(1);
        }
    };
    apply_overrides(&mut config, &args);
    let registry = PersonaRegistry::load(&config);

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Personas => {
            let selection = PersistedSelection::in_dir(&config.data_dir());
            let current = selection.load(&registry);
            print_personas(&registry, Some(current.as_str()));
            Ok(())
        }
        Commands::Chat => {
            let api_key = match resolve_api_key() {
                Ok(key) => key,
                Err(err) => {
                    eprintln!("❌ Error: {err}");
                    std::process::exit(1);
                }
            };
            let base_url = resolve_base_url(&config);
            debug!(%base_url, data_dir = %config.data_dir().display(), "starting chat");

            let data_dir = config.data_dir();
            let mut session = SessionState::initialize(
                registry,
                LogStore::new(&data_dir),
                PersistedSelection::in_dir(&data_dir),
                config.generation_settings(),
            );
            if let Some(name) = args.persona.as_deref() {
                if let Err(rejection) = session.switch_to(name) {
                    eprintln!("❌ {rejection}");
                }
            }

            let service = GeminiService::new(reqwest::Client::new(), base_url, api_key);
            run_chat(ConversationDriver::new(session, service)).await
        }
    }
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(model) = &args.model {
        config.model = Some(model.clone());
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
}
