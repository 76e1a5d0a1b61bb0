mod boot;
mod cli;
mod controller;
mod terminal;

use std::sync::Arc;
use std::time::Duration;

use gemchat_ai::SimulatedExecutor;

use crate::controller::SessionController;
use crate::terminal::Terminal;

/// Load environment variables from a .env file (KEY=VALUE lines).
fn load_dotenv() {
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidates = [
        // Workspace root, two levels up from crates/gemchat-app/
        manifest_dir.join("..").join("..").join(".env"),
        std::path::PathBuf::from(".env"),
    ];

    for path in &candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"').trim_matches('\'');
                    if std::env::var(key).is_err() {
                        std::env::set_var(key, value);
                    }
                }
            }
            return;
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file before anything reads the environment
    load_dotenv();

    let args = cli::parse();
    let (config, config_error) = boot::load_config(&args);

    let directive = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.directive());
    boot::init_logging(&directive);

    tracing::info!("gemchat v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(ref path) = args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    if let Some(e) = config_error {
        tracing::warn!("Config load failed, using defaults: {e}");
    }

    let settings = boot::initial_settings(&config, args.model.as_deref());
    let store = boot::open_store(&config, args.memory);
    let identity = boot::identity();
    let scope = boot::store_scope(&identity, &config);
    let executor = Arc::new(SimulatedExecutor::new(Duration::from_millis(
        config.execution.simulated_delay_ms,
    )));

    let (controller, events) = SessionController::new(
        store,
        scope,
        settings,
        boot::client_factory(&config),
        executor,
    );
    if let Err(e) = controller.initialize().await {
        tracing::error!("Failed to initialize chat: {e}");
        std::process::exit(1);
    }
    tracing::debug!(state = ?controller.state().await, "Controller ready");

    let terminal = Terminal::new(controller, events, boot::config_path(&args));
    if let Err(e) = terminal.run().await {
        tracing::error!("Terminal error: {e}");
        std::process::exit(1);
    }
    tracing::info!("Shutdown complete");
}
