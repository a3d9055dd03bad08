//! LLM model availability monitor entry point

use clap::Parser;
use llmmon::cli::serve::ServeArgs;
use llmmon::cli::{Cli, Commands};
use llmmon::config::MonitorConfig;
use llmmon::db::migrations::initialize_database;
use llmmon::discovery::Discoverer;
use llmmon::health::Prober;
use llmmon::notify::{
    LogSender, MessageSender, Notifier, TelegramBot, TelegramClient, TelegramSender,
};
use llmmon::registry::RecipientRegistry;
use llmmon::scheduler::{supervise, Scheduler};
use llmmon::shutdown::ShutdownController;
use llmmon::upstream::OpenRouterClient;
use llmmon::{api, logging, AppState};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _log_guard = match logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    let config = MonitorConfig::from_env();

    let result = match cli.command {
        Some(Commands::Serve(args)) => run_server(config, args).await,
        None => run_server(config, ServeArgs::from_env()).await,
        Some(Commands::Status(args)) => match open_database(&config).await {
            Ok(pool) => llmmon::cli::status::execute(&args, &pool).await,
            Err(e) => Err(e),
        },
        Some(Commands::Subscribe(args)) => match open_database(&config).await {
            Ok(pool) => {
                llmmon::cli::recipients::subscribe(&args, &RecipientRegistry::new(pool)).await
            }
            Err(e) => Err(e),
        },
        Some(Commands::Unsubscribe(args)) => match open_database(&config).await {
            Ok(pool) => {
                llmmon::cli::recipients::unsubscribe(&args, &RecipientRegistry::new(pool)).await
            }
            Err(e) => Err(e),
        },
        Some(Commands::Recipients) => match open_database(&config).await {
            Ok(pool) => llmmon::cli::recipients::list(&RecipientRegistry::new(pool)).await,
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn open_database(config: &MonitorConfig) -> Result<SqlitePool, anyhow::Error> {
    Ok(initialize_database(&config.database_url).await?)
}

async fn run_server(config: MonitorConfig, args: ServeArgs) -> Result<(), anyhow::Error> {
    info!("LLM Monitor v{}", env!("CARGO_PKG_VERSION"));

    // データベース初期化の失敗のみ致命的エラーとして扱う
    let pool = open_database(&config).await?;

    let openrouter = Arc::new(OpenRouterClient::from_config(&config)?);
    if config.openrouter_api_key.is_none() {
        warn!("OpenRouter API key not set, health checks will be skipped");
    }

    let shutdown = ShutdownController::default();
    let mut tasks = Vec::new();

    let scheduler = Scheduler::new(
        Discoverer::new(pool.clone(), openrouter.clone()),
        Prober::new(
            pool.clone(),
            openrouter,
            config.probe_timeout,
            config.probe_concurrency,
        ),
        config.discovery_interval,
        config.probe_interval,
        shutdown.clone(),
    );
    tasks.push(tokio::spawn(supervise("monitor", shutdown.clone(), move || {
        scheduler.clone().run()
    })));

    let telegram = match &config.telegram_bot_token {
        Some(token) => Some(TelegramClient::new(&config.telegram_api_url, token)?),
        None => {
            warn!("Telegram bot token not set, notifications will only be logged");
            None
        }
    };

    let sender: Arc<dyn MessageSender> = match &telegram {
        Some(api) => Arc::new(TelegramSender::new(api.clone())),
        None => Arc::new(LogSender),
    };
    let notifier = Notifier::new(pool.clone(), sender, config.notify_interval);
    {
        let shutdown_for_task = shutdown.clone();
        tasks.push(tokio::spawn(supervise("notifier", shutdown.clone(), move || {
            notifier.clone().run(shutdown_for_task.clone())
        })));
    }

    if let Some(api) = telegram {
        let bot = TelegramBot::new(api, pool.clone());
        let shutdown_for_task = shutdown.clone();
        tasks.push(tokio::spawn(supervise("telegram-bot", shutdown.clone(), move || {
            bot.clone().run(shutdown_for_task.clone())
        })));
    }

    if args.no_api {
        shutdown_signal(shutdown.clone()).await;
        shutdown.request_shutdown();
    } else {
        let app = api::create_router(AppState {
            db_pool: pool.clone(),
        });
        let bind_addr = args.bind_addr();
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        info!("HTTP API listening on http://{}", bind_addr);

        let signal = {
            let shutdown = shutdown.clone();
            async move {
                shutdown_signal(shutdown.clone()).await;
                shutdown.request_shutdown();
            }
        };
        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await?;
    }

    for task in tasks {
        if let Err(e) = task.await {
            error!(error = %e, "Background task ended abnormally");
        }
    }

    pool.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal(shutdown: ShutdownController) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = shutdown.wait() => {
            info!("Shutdown requested, shutting down...");
        }
    }
}
