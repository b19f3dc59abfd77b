//! Pure HTML renderers, one per view.
//!
//! Output is a fragment the webview drops into its content pane; styling
//! lives in the frontend stylesheet and is referenced only by class name.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::{
    db::{AggregateWindow, RawReading},
    matcher::Decision,
    settings::AnalysisSource,
};

use super::{data::AnalysisData, View, ViewData};

const NO_DATA: &str = "Belum ada data.";
const INCOMPLETE_DATA: &str = "Data belum lengkap.";

pub fn render(view: View, data: &ViewData) -> String {
    let body = match (view, data) {
        (View::Overview, _) => render_overview(),
        (View::Pipeline, _) => render_pipeline(),
        (View::Value, _) => render_value(),
        (View::About, _) => render_about(),
        (View::Realtime, ViewData::Realtime { readings }) => render_realtime(readings),
        (View::Analysis, ViewData::Analysis(analysis)) => render_analysis(analysis),
        (View::History, ViewData::History { windows, band }) => render_history(windows, *band),
        (view, _) => notice("warning", &format!("Tidak ada data untuk {}.", view.title())),
    };

    format!(
        "<section class=\"view view-{}\">{}{}</section>",
        view.as_str(),
        hero(view),
        body
    )
}

/// Sidebar links with the active view highlighted.
pub fn render_nav(active: View) -> String {
    let mut html = String::from("<nav class=\"sidebar\"><div class=\"sidebar-title\">🌍 IoT Big Data</div>");
    for view in View::ALL {
        let class = if view == active { "nav-card nav-active" } else { "nav-card" };
        let _ = write!(
            html,
            "<button class=\"{class}\" data-view=\"{}\">{} {}</button>",
            view.as_str(),
            view.icon(),
            escape_html(view.title())
        );
    }
    html.push_str("</nav>");
    html
}

fn hero(view: View) -> String {
    if view == View::Overview {
        return String::new();
    }
    format!(
        "<div class=\"hero\"><h2>{} {}</h2></div>",
        view.icon(),
        escape_html(view.title())
    )
}

fn notice(kind: &str, message: &str) -> String {
    format!("<div class=\"notice notice-{kind}\">{}</div>", escape_html(message))
}

fn metric(label: &str, value: &str) -> String {
    format!(
        "<div class=\"metric\"><span class=\"metric-label\">{}</span><span class=\"metric-value\">{}</span></div>",
        escape_html(label),
        escape_html(value)
    )
}

fn celsius(value: f64) -> String {
    format!("{value:.2} °C")
}

fn percent(value: f64) -> String {
    format!("{value:.2} %")
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn render_realtime(readings: &[RawReading]) -> String {
    let Some(latest) = readings.last() else {
        return notice("warning", NO_DATA);
    };

    let mut html = format!(
        "<div class=\"metrics\">{}{}</div>",
        metric("🌡 Temperature", &celsius(latest.temperature)),
        metric("💧 Humidity", &percent(latest.humidity))
    );

    html.push_str(
        "<table class=\"readings\"><thead><tr><th>Waktu</th><th>Temperature</th><th>Humidity</th></tr></thead><tbody>",
    );
    for reading in readings.iter().rev() {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            timestamp(&reading.created_at),
            celsius(reading.temperature),
            percent(reading.humidity)
        );
    }
    html.push_str("</tbody></table>");
    html
}

fn render_analysis(data: &AnalysisData) -> String {
    let Some(live) = &data.live else {
        return notice("warning", INCOMPLETE_DATA);
    };

    let condition = data
        .matched
        .as_ref()
        .map(|outcome| outcome.window.condition.as_str())
        .unwrap_or("-");

    let mut html = format!(
        "<div class=\"metrics\">{}{}{}</div>",
        metric("🌡 Realtime Temp", &celsius(live.temperature)),
        metric("💧 Realtime Humidity", &percent(live.humidity)),
        metric("🏷️ Kondisi (ETL)", condition)
    );

    match &data.matched {
        Some(outcome) => {
            let window = &outcome.window;
            let _ = write!(
                html,
                "<div class=\"card\"><h3>Kondisi Berdasarkan Data Historis (ETL)</h3>\
                 <p><b>Window:</b> {} – {}</p>\
                 <p><b>Avg Temperature:</b> {}</p>\
                 <p><b>Avg Humidity:</b> {}</p>\
                 <p><b>Risiko:</b> {}</p>\
                 <p><b>Rekomendasi:</b> {}</p>",
                timestamp(&window.window_start),
                timestamp(&window.window_end),
                celsius(window.avg_temperature),
                percent(window.avg_humidity),
                escape_html(&window.risk_level),
                escape_html(&window.recommendation)
            );
            if data.source != AnalysisSource::LatestWindow {
                let _ = write!(
                    html,
                    "<p class=\"distance\">Selisih suhu {:.2} °C (toleransi ±{:.2} °C), selisih kelembapan {:.2} %</p>",
                    outcome.temperature_diff, data.tolerance, outcome.humidity_diff
                );
            }
            if let Some(decision) = &data.derived {
                html.push_str(&decision_badge("Tindakan yang disarankan", decision));
            }
            html.push_str(
                "<hr><small>Analisis ini menggunakan data hasil ETL (clean data) sebagai dasar \
                 pengambilan keputusan, sementara nilai realtime digunakan untuk monitoring \
                 kondisi saat ini.</small></div>",
            );
        }
        None => {
            html.push_str(&notice(
                "info",
                &format!(
                    "Belum ada data historis dengan suhu rata-rata dalam ±{:.2} °C dari kondisi saat ini.",
                    data.tolerance
                ),
            ));
            if let Some(decision) = &data.fallback {
                html.push_str(&decision_badge("Perkiraan dari data realtime", decision));
            }
        }
    }

    html
}

fn decision_badge(heading: &str, decision: &Decision) -> String {
    format!(
        "<div class=\"decision\"><b>{}:</b> <span class=\"{}\">{}</span> · Risiko {} · {}</div>",
        escape_html(heading),
        decision.tone.css_class(),
        escape_html(&decision.condition),
        decision.risk.label(),
        escape_html(decision.action)
    )
}

fn render_history(windows: &[AggregateWindow], band: Option<(f64, f64)>) -> String {
    if windows.is_empty() {
        return notice("warning", NO_DATA);
    }

    let mut html = String::new();
    if let Some((min, max)) = band {
        let _ = write!(
            html,
            "<p class=\"filter\">Suhu rata-rata {:.2} – {:.2} °C</p>",
            min, max
        );
    }
    html.push_str(
        "<table class=\"windows\"><thead><tr><th>Mulai</th><th>Selesai</th><th>Avg Temp</th>\
         <th>Avg Humidity</th><th>Kondisi</th><th>Risiko</th><th>Rekomendasi</th></tr></thead><tbody>",
    );
    for window in windows {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            timestamp(&window.window_start),
            timestamp(&window.window_end),
            celsius(window.avg_temperature),
            percent(window.avg_humidity),
            escape_html(&window.condition),
            escape_html(&window.risk_level),
            escape_html(&window.recommendation)
        );
    }
    html.push_str("</tbody></table>");
    html
}

fn render_overview() -> String {
    String::from(
        "<div class=\"hero\">\
         <h1>Implementasi Big Data Pipeline untuk Analisis dan Visualisasi Data Sensor Suhu \
         Berbasis Internet of Things (IoT)</h1>\
         <p>Data suhu dan kelembapan dicatat sensor DHT22 secara berkala. Data mentah \
         dikumpulkan (ingestion), dibersihkan dan diringkas per jendela waktu (ETL), \
         disimpan, lalu disajikan pada dashboard ini.</p>\
         <p>Dashboard hanya membaca hasil pipeline: data mentah untuk monitoring realtime \
         dan data bersih untuk analisis kondisi ruangan.</p>\
         </div>",
    )
}

fn render_pipeline() -> String {
    String::from(
        "<div class=\"card\">\
         <p><b>Alur Big Data Pipeline:</b></p>\
         <ul>\
         <li>Data suhu dikumpulkan dari sensor IoT sebagai data mentah (RAW).</li>\
         <li>Data mentah disimpan ke dalam database.</li>\
         <li>Data diproses melalui ETL menjadi ringkasan per jendela waktu.</li>\
         <li>Hasil data bersih (CLEAN) disimpan kembali ke database.</li>\
         <li>Data yang telah diolah divisualisasikan melalui dashboard.</li>\
         </ul>\
         </div>",
    )
}

fn render_value() -> String {
    String::from(
        "<div class=\"card\">\
         <ul>\
         <li>Data suhu menjadi lebih rapi dan konsisten setelah melalui proses ETL.</li>\
         <li>Visualisasi membantu memahami pola perubahan suhu dari waktu ke waktu.</li>\
         <li>Kondisi saat ini dapat dibandingkan dengan kondisi historis yang serupa.</li>\
         </ul>\
         </div>",
    )
}

fn render_about() -> String {
    String::from(
        "<div class=\"card\">\
         <b>Mata Kuliah:</b> Big Data<br>\
         <b>Proyek:</b> IoT Environmental Monitoring\
         </div>",
    )
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
