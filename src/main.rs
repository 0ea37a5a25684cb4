use clap::Parser;
use drugbot::api::{ChatBackend, HttpBackend};
use drugbot::core::config::{self, CliOverrides, DrugbotConfig};
use drugbot::core::locale::Locale;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "drugbot", about = "Terminal client for the Drugbot medicine chatbot")]
struct Args {
    /// Backend base URL (overrides DRUGBOT_BACKEND_URL and the config file)
    #[arg(long)]
    backend_url: Option<String>,

    /// Open this session at startup instead of the newest one
    #[arg(long)]
    session: Option<String>,

    /// Ask the backend to answer with retrieval augmentation
    #[arg(long)]
    rag: bool,

    /// Read answers as a newline-delimited JSON stream
    #[arg(long)]
    stream: bool,

    /// Interface language
    #[arg(long, value_enum)]
    locale: Option<Locale>,

    /// Check backend health, print the status and exit
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to drugbot.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("drugbot.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("{}, using defaults", e);
        eprintln!("warning: {e}, using defaults");
        DrugbotConfig::default()
    });
    let cli = CliOverrides {
        backend_url: args.backend_url,
        locale: args.locale,
        use_rag: args.rag,
        streaming: args.stream,
        session: args.session,
    };
    let resolved = config::resolve(&file_config, &cli);
    log::info!("Drugbot starting up with config: {:?}", resolved);

    if args.health {
        let backend = HttpBackend::new(&resolved.backend_url);
        return match backend.health().await {
            Ok(health) => {
                println!("{}: {}", resolved.locale.strings().health_ok, health.status);
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::warn!("Health check failed: {}", e);
                eprintln!("{}: {e}", resolved.locale.strings().health_failed);
                ExitCode::FAILURE
            }
        };
    }

    match drugbot::tui::run(resolved) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Terminal error: {}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
