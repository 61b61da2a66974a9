// Matchday entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config and the club catalog
// 3. Open the database
// 4. Build the feed client and application state
// 5. Restore the saved session and load the feeds
// 6. Spawn the app loop, run the TUI until quit
// 7. Wait briefly for the app loop to finish

use std::path::Path;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tracing::{error, info};

use matchday_app::app::{self, AppState, Clock};
use matchday_app::config;
use matchday_app::db::Database;
use matchday_app::feed::client::FootballDataClient;
use matchday_core::club::{load_catalog_csv, ClubCatalog};
use matchday_tui::tui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Matchday starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: season {} ({} to {}), auto refresh {}",
        config.season.name, config.season.start, config.season.end, config.feed.auto_refresh
    );

    let catalog = match &config.data.clubs {
        Some(path) => load_catalog_csv(Path::new(path))
            .with_context(|| format!("failed to load club catalog from {path}"))?,
        None => ClubCatalog::premier_league(),
    };
    info!("Club catalog ready: {} clubs", catalog.len());

    let db_path = config.resolved_db_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db_path = db_path.to_string_lossy().into_owned();
    let db = Database::open(&db_path).context("failed to open database")?;
    info!("Database opened at {}", db_path);

    let client = FootballDataClient::from_config(&config, catalog.clone())
        .context("failed to build football-data client")?;
    if client.has_api_key() {
        info!("football-data.org API key configured");
    } else {
        info!("No football-data.org API key, running on placeholder data");
    }

    let mut app_state = AppState::new(
        config,
        catalog,
        db,
        Box::new(client),
        StdRng::from_entropy(),
        Clock::System,
    );
    if let Err(e) = app_state.initialize().await {
        error!("Session restore failed: {:#}", e);
        return Err(e.context("session restore failed"));
    }

    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    info!("Application ready");

    // Blocks until the user quits
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Matchday shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("matchday.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("matchday_core=info,matchday_app=info,matchday_tui=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
