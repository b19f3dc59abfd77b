pub mod dashboard;
pub mod db;
pub mod matcher;
pub mod settings;
mod utils;

pub use dashboard::{RefreshController, RenderedView, View, ViewData};
pub use db::{AggregateWindow, Database, RawReading};
pub use matcher::{select_nearest, MatchOutcome};
pub use settings::{AnalysisSource, DashboardSettings, SettingsStore};

#[cfg(feature = "desktop")]
pub use desktop::run;

#[cfg(feature = "desktop")]
mod desktop {
    use std::sync::Arc;

    use log::{info, warn};
    use tauri::{Emitter, Manager};
    use tokio::sync::watch;

    use crate::{
        dashboard::{
            commands::{
                get_active_view, get_dashboard_settings, get_latest_render, get_navigation,
                get_view_data, navigate, render_view, update_dashboard_settings,
            },
            RefreshController, RenderedView, View,
        },
        db::Database,
        settings::SettingsStore,
    };

    const DEFAULT_DB_FILE: &str = "iot_db.sqlite3";
    const REFRESH_EVENT: &str = "dashboard-refreshed";

    pub(crate) struct AppState {
        pub(crate) db: Database,
        pub(crate) settings: Arc<SettingsStore>,
        pub(crate) refresh: RefreshController,
    }

    /// Pushes every render from the refresh loop to the webview.
    fn forward_refreshes(
        app_handle: tauri::AppHandle,
        mut rendered_rx: watch::Receiver<Option<RenderedView>>,
    ) {
        tauri::async_runtime::spawn(async move {
            while rendered_rx.changed().await.is_ok() {
                let rendered = rendered_rx.borrow_and_update().clone();
                if let Some(rendered) = rendered {
                    if let Err(err) = app_handle.emit(REFRESH_EVENT, &rendered) {
                        warn!("Failed to emit {REFRESH_EVENT}: {err}");
                    }
                }
            }
        });
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        // Info by default; RUST_LOG takes precedence when set.
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .init();

        info!("IoT dashboard starting up...");

        tauri::Builder::default()
            .plugin(tauri_plugin_opener::init())
            .setup(|app| {
                let result = (|| -> anyhow::Result<()> {
                    let app_data_dir = app
                        .path()
                        .app_data_dir()
                        .map_err(|err| anyhow::anyhow!(err))?;
                    std::fs::create_dir_all(&app_data_dir)?;

                    let settings = Arc::new(SettingsStore::new(app_data_dir.join("settings.json"))?);
                    let db_path = settings
                        .get()
                        .resolve_database_path(app_data_dir.join(DEFAULT_DB_FILE));

                    // A database that cannot be opened ends the session here.
                    let database = Database::new(db_path)?;

                    let refresh = {
                        let database = database.clone();
                        let settings = settings.clone();
                        tauri::async_runtime::block_on(async move {
                            RefreshController::spawn(database, settings, View::default())
                        })
                    };
                    forward_refreshes(app.handle().clone(), refresh.subscribe());

                    app.manage(AppState {
                        db: database,
                        settings,
                        refresh,
                    });

                    Ok(())
                })();

                result.map_err(|err| err.into())
            })
            .invoke_handler(tauri::generate_handler![
                render_view,
                navigate,
                get_active_view,
                get_latest_render,
                get_navigation,
                get_view_data,
                get_dashboard_settings,
                update_dashboard_settings,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}

#[cfg(feature = "desktop")]
pub(crate) use desktop::AppState;
