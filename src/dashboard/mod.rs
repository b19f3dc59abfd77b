pub mod data;
pub mod refresh;
pub mod render;
pub mod view;

pub use data::{fetch_view_data, AnalysisData, ViewData};
pub use refresh::{refresh_view, RefreshController, RenderedView};
pub use render::{render, render_nav};
pub use view::View;

#[cfg(feature = "desktop")]
pub mod commands;
