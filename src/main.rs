use std::sync::Arc;

use env_logger::Env;

use salesboard::config;
use salesboard::feed::run_feed_listener;
use salesboard::notify::{LogNotifier, Notifier};
use salesboard::render::{Render, TextRenderer};
use salesboard::services::customers;
use salesboard::state::AppState;
use salesboard::store::firestore::FirestoreStore;
use salesboard::store::memory::MemoryStore;
use salesboard::store::DocumentStore;

#[tokio::main]
async fn main() -> Result<(), String> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = config::load_config().map_err(|e| format!("config: {}", e))?;
    let state = Arc::new(AppState::new(config.targets.clone()));

    let store: Arc<dyn DocumentStore> = if config.store.project_id.is_some() {
        Arc::new(FirestoreStore::new(&config.store)?)
    } else {
        log::info!("no store.projectId configured, running against the in-memory store");
        Arc::new(MemoryStore::new())
    };

    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let render: Arc<dyn Render> = Arc::new(TextRenderer);

    // Initial load so the dashboard is populated before the first push.
    customers::reload(&state, store.as_ref(), notifier.as_ref(), render.as_ref()).await;

    let feed = store.subscribe();
    let listener = tokio::spawn(run_feed_listener(
        state.clone(),
        feed,
        notifier.clone(),
        render.clone(),
    ));

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("signal: {}", e))?;
    log::info!("shutting down");
    listener.abort();
    Ok(())
}
