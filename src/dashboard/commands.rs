//! Tauri commands behind the dashboard webview.

use tauri::State;

use crate::{
    dashboard::{fetch_view_data, refresh_view, render_nav, RenderedView, View, ViewData},
    settings::DashboardSettings,
    AppState,
};

#[tauri::command]
pub async fn render_view(state: State<'_, AppState>, view: View) -> Result<RenderedView, String> {
    Ok(refresh_view(view, &state.db, &state.settings).await)
}

/// Makes `view` active for the refresh loop and returns its first render.
#[tauri::command]
pub async fn navigate(state: State<'_, AppState>, view: View) -> Result<RenderedView, String> {
    state.refresh.navigate(view);
    Ok(refresh_view(view, &state.db, &state.settings).await)
}

#[tauri::command]
pub fn get_active_view(state: State<'_, AppState>) -> View {
    state.refresh.active_view()
}

#[tauri::command]
pub fn get_latest_render(state: State<'_, AppState>) -> Option<RenderedView> {
    state.refresh.latest()
}

#[tauri::command]
pub fn get_navigation(state: State<'_, AppState>) -> String {
    render_nav(state.refresh.active_view())
}

/// Raw view payload for frontend charting.
#[tauri::command]
pub async fn get_view_data(state: State<'_, AppState>, view: View) -> Result<ViewData, String> {
    let settings = state.settings.get();
    Ok(fetch_view_data(view, &state.db, &settings).await)
}

#[tauri::command]
pub fn get_dashboard_settings(state: State<'_, AppState>) -> DashboardSettings {
    state.settings.get()
}

#[tauri::command]
pub fn update_dashboard_settings(
    state: State<'_, AppState>,
    settings: DashboardSettings,
) -> Result<DashboardSettings, String> {
    state
        .settings
        .update(settings)
        .map_err(|e| e.to_string())?;
    Ok(state.settings.get())
}
