use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, Duration, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{db::Database, settings::SettingsStore};

use super::{fetch_view_data, render, View, ViewData};

// Set to true to log every refresh cycle
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Upper bound on one fetch-and-render cycle; a slow database skips the tick.
const REFRESH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedView {
    pub view: View,
    pub html: String,
    pub data: ViewData,
    pub refreshed_at: DateTime<Utc>,
}

/// One independent fetch-and-render cycle for `view`.
pub async fn refresh_view(view: View, db: &Database, settings: &SettingsStore) -> RenderedView {
    let settings = settings.get();
    let data = fetch_view_data(view, db, &settings).await;
    RenderedView {
        view,
        html: render(view, &data),
        data,
        refreshed_at: Utc::now(),
    }
}

/// Re-renders the active view on a fixed cadence and publishes the result.
///
/// The active view is the only state carried between cycles. Live views are
/// fetched again on each tick; static views are rendered once per visit.
#[derive(Clone)]
pub struct RefreshController {
    active_tx: Arc<watch::Sender<View>>,
    rendered_rx: watch::Receiver<Option<RenderedView>>,
    cancel_token: CancellationToken,
    handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl RefreshController {
    /// Starts the loop on the current tokio runtime.
    pub fn spawn(db: Database, settings: Arc<SettingsStore>, initial: View) -> Self {
        let (active_tx, active_rx) = watch::channel(initial);
        let (rendered_tx, rendered_rx) = watch::channel(None);
        let cancel_token = CancellationToken::new();

        let handle = tokio::spawn(refresh_loop(
            db,
            settings,
            active_rx,
            rendered_tx,
            cancel_token.clone(),
        ));

        Self {
            active_tx: Arc::new(active_tx),
            rendered_rx,
            cancel_token,
            handle: Arc::new(Mutex::new(Some(handle))),
        }
    }

    pub fn active_view(&self) -> View {
        *self.active_tx.borrow()
    }

    /// Switches the active view; the loop renders it right away.
    pub fn navigate(&self, view: View) {
        self.active_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }

    pub fn latest(&self) -> Option<RenderedView> {
        self.rendered_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<RenderedView>> {
        self.rendered_rx.clone()
    }

    pub async fn shutdown(&self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.lock().await.take() {
            if let Err(err) = handle.await {
                log_error!("refresh loop task failed to join: {err}");
            }
        }
    }
}

async fn refresh_loop(
    db: Database,
    settings: Arc<SettingsStore>,
    mut active_rx: watch::Receiver<View>,
    rendered_tx: watch::Sender<Option<RenderedView>>,
    cancel_token: CancellationToken,
) {
    let mut interval_secs = settings.get().refresh_interval_secs.max(1);
    let mut ticker = new_ticker(interval_secs);
    let mut published: Option<View> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = active_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                ticker.reset();
            }
            _ = cancel_token.cancelled() => {
                log_info!("refresh loop shutting down");
                break;
            }
        }

        let view = *active_rx.borrow_and_update();
        if view.is_live() || published != Some(view) {
            let cycle = refresh_view(view, &db, &settings);
            match time::timeout(Duration::from_secs(REFRESH_TIMEOUT_SECS), cycle).await {
                Ok(rendered) => {
                    log_debug!("refreshed {} view", view);
                    rendered_tx.send_replace(Some(rendered));
                    published = Some(view);
                }
                Err(_) => log_warn!(
                    "refresh of {} view timed out (> {}s) reading {}",
                    view,
                    REFRESH_TIMEOUT_SECS,
                    db.path().display()
                ),
            }
        }

        let configured = settings.get().refresh_interval_secs.max(1);
        if configured != interval_secs {
            log_info!("refresh interval changed to {}s", configured);
            interval_secs = configured;
            ticker = new_ticker(interval_secs);
            // A fresh interval fires immediately; skip that extra cycle.
            ticker.reset();
        }
    }
}

fn new_ticker(interval_secs: u64) -> time::Interval {
    let mut ticker = time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
