//! Change-feed listener. Drains `FeedEvent`s from a store subscription and
//! applies them to the shared state: each snapshot push replaces the local
//! copy wholesale and re-renders, a lapse surfaces a warning while the
//! last-known-good snapshot stays up.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::notify::Notifier;
use crate::render::Render;
use crate::services::dashboard;
use crate::state::AppState;
use crate::store::FeedEvent;
use crate::types::CustomerFilter;

/// Runs until the feed channel closes. The listener is the only writer of
/// the snapshot during steady state, so pushes apply in arrival order.
pub async fn run_feed_listener(
    state: Arc<AppState>,
    mut feed: mpsc::Receiver<FeedEvent>,
    notifier: Arc<dyn Notifier>,
    render: Arc<dyn Render>,
) {
    while let Some(event) = feed.recv().await {
        match event {
            FeedEvent::Snapshot(records) => {
                log::debug!("feed: snapshot with {} records", records.len());
                state.replace_snapshot(records);
                render.render(&dashboard::view(&state, &CustomerFilter::default()));
            }
            FeedEvent::Lapsed(reason) => {
                log::warn!("feed: lapsed: {}", reason);
                notifier.notify("資料同步暫時中斷，顯示最後已知資料", true);
            }
        }
    }
    log::info!("feed: channel closed, listener exiting");
}
