use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

use tendril_bot::application::errors::{BotError, ConfigError};
use tendril_bot::application::events::Listener;
use tendril_bot::domain::entities::EventType;
use tendril_bot::domain::traits::RemoteClient;
use tendril_bot::infrastructure::adapters::{ConsoleClient, TelegramClient};
use tendril_bot::infrastructure::config::{strip_all_whitespace, Config};
use tendril_bot::plugins::{builtin, PluginManager};

#[derive(Parser)]
#[command(name = "tendril-bot")]
#[command(about = "A minimal extensible chat bot host", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
    /// List the plugin entries this build can load
    Plugins,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(&cli.config, cli.token) {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("tendril-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
        Commands::Plugins => {
            list_entries();
        }
    }
}

fn load_config(config_path: &str) -> Config {
    if std::path::Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    }
}

fn run_bot(config_path: &str, token_override: Option<String>) -> Result<(), BotError> {
    let config = load_config(config_path);
    tracing::info!("Starting tendril-bot: {}", config.bot.name);

    let catalog = Arc::new(builtin::catalog()?);
    let manager = PluginManager::new(catalog);

    let token = token_override
        .map(|t| strip_all_whitespace(&t))
        .filter(|t| !t.is_empty())
        .or_else(|| config.telegram_token());

    let client: Arc<dyn RemoteClient> = match token {
        Some(token) => {
            let poll_timeout = config.adapters.telegram
                .as_ref()
                .map(|t| t.poll_timeout_secs)
                .unwrap_or(30);
            Arc::new(TelegramClient::new(token, poll_timeout))
        }
        None if config.adapters.console.as_ref().is_some_and(|c| c.enabled) => {
            Arc::new(ConsoleClient::new(config.bot.name.clone()))
        }
        None => {
            return Err(ConfigError::InvalidValue(
                "no adapter enabled: set a Telegram token or enable the console".to_string(),
            )
            .into());
        }
    };

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;

    let result = rt.block_on(async {
        if let Err(e) = initialize(&manager, &client, &config).await {
            tracing::error!("Error initializing: {}", e);
            return Err(e);
        }

        client.connect().await
    });

    // The console adapter leaves a blocking stdin read behind
    rt.shutdown_timeout(Duration::from_secs(1));
    tracing::info!("Bot stopped");
    result
}

/// Wire the manager to the client and load every configured plugin directory
async fn initialize(manager: &PluginManager, client: &Arc<dyn RemoteClient>, config: &Config) -> Result<(), BotError> {
    let add_client = client.clone();
    let remove_client = client.clone();
    manager.set_event_listener_callbacks(
        Arc::new(move |event_type: EventType, listener: Listener| add_client.add_event_listener(event_type, listener)),
        Arc::new(move |event_type: EventType, listener: &Listener| remove_client.remove_event_listener(event_type, listener)),
    )?;

    manager.create_event_listeners()?;

    let disconnect_client = client.clone();
    manager.set_disconnect_callback(Arc::new(move || disconnect_client.disconnect()))?;

    for dir in &config.plugins.directories {
        manager.load_plugins(dir).await?;
    }

    tracing::info!(
        "Plugin system initialized with {} plugins, commands: {}",
        manager.list_plugins().len(),
        manager.active_commands().join(", ")
    );
    Ok(())
}

fn init_config() {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => tracing::error!("{}", e),
    }
}

fn list_entries() {
    match builtin::catalog() {
        Ok(catalog) => {
            for entry in catalog.entries() {
                println!("{}", entry);
            }
        }
        Err(e) => tracing::error!("{}", e),
    }
}
