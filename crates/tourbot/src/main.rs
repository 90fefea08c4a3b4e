use anyhow::Result;
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::prelude::*;

use tourbot::cli::{Cli, Commands};
use tourbot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, TelegramMediaSource};
use tourcore::core::log_startup_configuration;
use tourcore::storage::ExcursionStore;
use tourcore::{config, create_pool, init_logger, Catalog, EditorController, LocalMediaStore, SqliteExcursionStore};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up global panic handler to catch panics in dispatcher
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Load environment variables from .env if present; LOG_FILE_PATH may come from it
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        None | Some(Commands::Run) => run_bot().await,
        Some(Commands::Migrate) => run_migrate(),
        Some(Commands::Export { output, published_only }) => run_export(output, published_only),
    }
}

async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");
    log_startup_configuration();

    let db_pool = Arc::new(create_pool(&config::DATABASE_PATH)?);
    let store = Arc::new(SqliteExcursionStore::new(Arc::clone(&db_pool)));
    let excursions = store.load_all()?;
    log::info!(
        "Loaded {} excursions with {} points",
        excursions.len(),
        excursions.iter().map(|e| e.points.len()).sum::<usize>()
    );

    let bot = create_bot()?;
    let bot_info = bot.get_me().await?;
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username, bot_info.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let controller = EditorController::new(
        Arc::new(Catalog::new(excursions)),
        store,
        Arc::new(LocalMediaStore::from_env()),
        Arc::new(TelegramMediaSource::new(bot.clone())?),
    );

    // Create the dispatcher handler tree
    let handler = schema(HandlerDeps::new(Arc::new(controller), config::admin::ADMIN_IDS.clone()));

    log::info!("Starting bot in long polling mode");
    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Opens the database, which applies pending migrations.
fn run_migrate() -> Result<()> {
    create_pool(&config::DATABASE_PATH)?;
    log::info!("Database {} is up to date", *config::DATABASE_PATH);
    Ok(())
}

fn run_export(output: Option<PathBuf>, published_only: bool) -> Result<()> {
    let db_pool = Arc::new(create_pool(&config::DATABASE_PATH)?);
    let mut excursions = SqliteExcursionStore::new(db_pool).load_all()?;
    if published_only {
        excursions.retain(|excursion| !excursion.is_draft);
    }
    excursions.sort_by_key(|excursion| excursion.id);

    let json = serde_json::to_string_pretty(&excursions)?;
    match output {
        Some(path) => {
            fs_err::write(&path, json)?;
            log::info!("Exported {} excursions to {}", excursions.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
