use std::path::Path;
use std::process::exit;

use gram_updater::{
    app_state::AppStateManager,
    config::{UpdaterConfig, CONFIG_FILE},
    logging::init_logging,
    update::{self, UpdateOutcome},
};

fn main() {
    init_logging();

    let config = match UpdaterConfig::load_or_default(Path::new(CONFIG_FILE)) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("failed to load {CONFIG_FILE}: {err}");
            exit(1);
        }
    };

    let app_state = AppStateManager::with_console();

    match update::run(&config, &app_state) {
        Some(UpdateOutcome::Updated) => println!("File updated."),
        Some(UpdateOutcome::Unchanged) => println!("File content unchanged, no update needed."),
        Some(UpdateOutcome::UpToDate) => println!("File is up to date."),
        // Already reported; a failed check is not a process failure.
        None => {}
    }
}
