use anyhow::{Context, Result};
use rusqlite::{params_from_iter, Row};

use crate::db::{
    helpers::{decodable_rows, decode_error, parse_datetime},
    models::AggregateWindow,
    Database,
};

const SELECT_COLUMNS: &str = "SELECT id, window_start, window_end, avg_temperature, avg_humidity,
        condition, risk_level, recommendation
 FROM dht22_clean";

fn map_window(row: &Row<'_>) -> rusqlite::Result<AggregateWindow> {
    let window_start: String = row.get(1)?;
    let window_end: String = row.get(2)?;
    Ok(AggregateWindow {
        id: row.get(0)?,
        window_start: parse_datetime(&window_start, "window_start").map_err(decode_error)?,
        window_end: parse_datetime(&window_end, "window_end").map_err(decode_error)?,
        avg_temperature: row.get(3)?,
        avg_humidity: row.get(4)?,
        condition: row.get(5)?,
        risk_level: row.get(6)?,
        recommendation: row.get(7)?,
    })
}

impl Database {
    /// Most recently closed decodable window by `window_end`.
    pub async fn latest_window(&self) -> Result<Option<AggregateWindow>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} ORDER BY window_end DESC, id DESC"
            ))?;
            let latest = decodable_rows(stmt.query_map([], map_window)?, "aggregate window")
                .next()
                .transpose()
                .context("failed to load latest aggregate window")?;
            Ok(latest)
        })
        .await
    }

    /// Windows whose average temperature lies in `[min_temperature, max_temperature]`.
    ///
    /// Used to narrow candidates before nearest-match selection instead of
    /// loading the whole collection.
    pub async fn windows_in_temperature_range(
        &self,
        min_temperature: f64,
        max_temperature: f64,
    ) -> Result<Vec<AggregateWindow>> {
        self.window_history(Some((min_temperature, max_temperature)))
            .await
    }

    /// Every window, for the client-side filtering mode.
    pub async fn all_windows(&self) -> Result<Vec<AggregateWindow>> {
        self.window_history(None).await
    }

    /// Window history ordered by `window_start` ascending, optionally limited
    /// to an average-temperature band.
    pub async fn window_history(
        &self,
        temperature_range: Option<(f64, f64)>,
    ) -> Result<Vec<AggregateWindow>> {
        self.execute(move |conn| {
            let (filter, bounds) = match temperature_range {
                Some((min_temperature, max_temperature)) => (
                    "WHERE avg_temperature >= ?1 AND avg_temperature <= ?2",
                    vec![min_temperature, max_temperature],
                ),
                None => ("", Vec::new()),
            };
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} {filter} ORDER BY window_start ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params_from_iter(bounds), map_window)?;
            let windows = decodable_rows(rows, "aggregate window")
                .collect::<Result<Vec<_>, _>>()
                .context("failed to load aggregate windows")?;
            Ok(windows)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::{open_temp, seed_window, ts};

    #[tokio::test]
    async fn latest_window_uses_window_end() {
        let (_dir, db) = open_temp();
        seed_window(
            &db,
            "2024-05-01T10:00:00+00:00",
            "2024-05-01T10:05:00+00:00",
            25.0,
            55.0,
            "Nyaman",
        )
        .await;
        seed_window(
            &db,
            "2024-05-01T09:00:00+00:00",
            "2024-05-01T11:00:00+00:00",
            27.0,
            65.0,
            "Gerah",
        )
        .await;

        let latest = db.latest_window().await.unwrap().expect("window");
        assert_eq!(latest.condition, "Gerah");
        assert_eq!(latest.window_end, ts("2024-05-01T11:00:00+00:00"));
    }

    #[tokio::test]
    async fn latest_window_absent_when_etl_has_not_run() {
        let (_dir, db) = open_temp();
        assert!(db.latest_window().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn range_query_is_inclusive_on_both_ends() {
        let (_dir, db) = open_temp();
        for (minute, temp) in [(0, 24.5), (5, 25.0), (10, 25.5), (15, 25.6)] {
            let start = format!("2024-05-01T10:{minute:02}:00+00:00");
            let end = format!("2024-05-01T10:{:02}:00+00:00", minute + 5);
            seed_window(&db, &start, &end, temp, 50.0, "Nyaman").await;
        }

        let windows = db.windows_in_temperature_range(24.5, 25.5).await.unwrap();
        let temps: Vec<f64> = windows.iter().map(|w| w.avg_temperature).collect();
        assert_eq!(temps, vec![24.5, 25.0, 25.5]);
    }

    #[tokio::test]
    async fn history_is_sorted_by_window_start() {
        let (_dir, db) = open_temp();
        seed_window(
            &db,
            "2024-05-02T00:00:00+00:00",
            "2024-05-02T00:05:00+00:00",
            23.0,
            45.0,
            "Nyaman",
        )
        .await;
        seed_window(
            &db,
            "2024-05-01T00:00:00+00:00",
            "2024-05-01T00:05:00+00:00",
            28.0,
            75.0,
            "Gerah",
        )
        .await;

        let history = db.all_windows().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].condition, "Gerah");
        assert_eq!(history[1].condition, "Nyaman");
    }

    #[tokio::test]
    async fn malformed_window_is_skipped() {
        let (_dir, db) = open_temp();
        seed_window(
            &db,
            "2024-05-01T10:00:00+00:00",
            "2024-05-01T10:05:00+00:00",
            25.0,
            55.0,
            "Nyaman",
        )
        .await;
        seed_window(&db, "2024-05-01T10:05:00+00:00", "garbage", 25.1, 56.0, "Rusak").await;

        let latest = db.latest_window().await.unwrap().expect("window");
        assert_eq!(latest.condition, "Nyaman");

        let in_band = db.windows_in_temperature_range(24.5, 25.5).await.unwrap();
        assert_eq!(in_band.len(), 1);
        assert_eq!(in_band[0].condition, "Nyaman");
    }
}
